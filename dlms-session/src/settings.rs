//! DLMS communication settings
//!
//! [`DlmsSettings`] is the per-connection context shared by the framing and
//! application layers. It owns the HDLC frame sequencer of the link together
//! with addressing, invoke id, block transfer and association parameters.

use crate::config::SettingsConfig;
use crate::hdlc::sequence::{FrameCheck, FrameSequencer};
use dlms_core::{
    Authentication, Conformance, ConnectionState, DlmsError, DlmsResult, InterfaceType, Priority,
    Role, ServiceClass, Standard,
};

/// DLMS version number proposed in the initiate request
pub const DLMS_VERSION: u8 = 6;

/// Largest PDU size that can be announced
pub const MAX_RECEIVE_PDU_SIZE: u16 = 0xFFFF;

/// Length of a system title in bytes
pub const SYSTEM_TITLE_LENGTH: usize = 8;

/// Communication settings of one DLMS connection
#[derive(Debug, Clone)]
pub struct DlmsSettings {
    sequencer: FrameSequencer,

    client_address: u16,
    server_address: u32,
    server_address_size: u8,
    interface_type: InterfaceType,

    authentication: Authentication,
    password: Option<Vec<u8>>,
    custom_challenges: bool,
    ctos_challenge: Option<Vec<u8>>,
    stoc_challenge: Option<Vec<u8>>,
    source_system_title: Option<[u8; SYSTEM_TITLE_LENGTH]>,

    invoke_id: u8,
    long_invoke_id: u32,
    priority: Priority,
    service_class: ServiceClass,

    use_logical_name_referencing: bool,
    proposed_conformance: Conformance,
    negotiated_conformance: Conformance,
    dlms_version: u8,
    max_pdu_size: u16,
    max_server_pdu_size: u16,
    quality_of_service: u8,
    standard: Standard,
    use_utc_to_normal_time: bool,
    user_id: Option<u8>,

    connection_state: ConnectionState,
    allow_anonymous_access: bool,

    window_size: u8,
    starting_packet_index: u32,
    block_index: u32,
    block_number_ack: u16,
    count: u32,
    index: u32,
}

impl DlmsSettings {
    /// Create settings with defaults for the given side of the connection
    pub fn new(role: Role) -> Self {
        let use_logical_name_referencing = true;
        Self {
            sequencer: FrameSequencer::new(role),
            client_address: 0x10,
            server_address: 0x01,
            server_address_size: 1,
            interface_type: InterfaceType::Hdlc,
            authentication: Authentication::None,
            password: None,
            custom_challenges: false,
            ctos_challenge: None,
            stoc_challenge: None,
            source_system_title: None,
            invoke_id: 1,
            long_invoke_id: 1,
            priority: Priority::High,
            service_class: ServiceClass::Confirmed,
            use_logical_name_referencing,
            proposed_conformance: Conformance::initial(use_logical_name_referencing),
            negotiated_conformance: Conformance::EMPTY,
            dlms_version: DLMS_VERSION,
            max_pdu_size: MAX_RECEIVE_PDU_SIZE,
            max_server_pdu_size: MAX_RECEIVE_PDU_SIZE,
            quality_of_service: 0,
            standard: Standard::Dlms,
            use_utc_to_normal_time: false,
            user_id: None,
            connection_state: ConnectionState::NONE,
            allow_anonymous_access: false,
            window_size: 1,
            starting_packet_index: 1,
            block_index: 1,
            block_number_ack: 0,
            count: 0,
            index: 0,
        }
    }

    /// Create settings from a validated configuration record
    pub fn from_config(config: &SettingsConfig) -> DlmsResult<Self> {
        config.validate()?;
        let mut settings = Self::new(config.role);
        settings.client_address = config.client_address;
        settings.server_address = config.server_address;
        settings.server_address_size = config.server_address_size;
        settings.interface_type = config.interface_type;
        settings.authentication = config.authentication;
        settings.set_use_logical_name_referencing(config.use_logical_name_referencing);
        settings.window_size = config.window_size;
        settings.max_pdu_size = config.max_pdu_size;
        settings.set_starting_packet_index(config.starting_packet_index);
        settings.standard = config.standard;
        settings.allow_anonymous_access = config.allow_anonymous_access;
        settings
            .sequencer
            .set_skip_validation(config.skip_frame_check);
        if config.skip_frame_check {
            log::warn!("HDLC frame sequence check is disabled");
        }
        Ok(settings)
    }

    pub fn role(&self) -> Role {
        self.sequencer.role()
    }

    pub fn is_server(&self) -> bool {
        self.role().is_server()
    }

    // Frame sequence

    pub fn sequencer(&self) -> &FrameSequencer {
        &self.sequencer
    }

    pub fn sequencer_mut(&mut self) -> &mut FrameSequencer {
        &mut self.sequencer
    }

    pub fn reset_frame_sequence(&mut self) {
        self.sequencer.reset();
    }

    pub fn check_frame(&mut self, control: u8) -> bool {
        self.sequencer.check_frame(control)
    }

    pub fn check_frame_detailed(&mut self, control: u8) -> FrameCheck {
        self.sequencer.check_frame_detailed(control)
    }

    pub fn next_send(&mut self, first: bool) -> u8 {
        self.sequencer.next_send(first)
    }

    pub fn receiver_ready(&mut self) -> u8 {
        self.sequencer.receiver_ready()
    }

    pub fn keep_alive(&mut self) -> u8 {
        self.sequencer.keep_alive()
    }

    pub fn skip_frame_check(&self) -> bool {
        self.sequencer.skip_validation()
    }

    /// Accept out-of-sequence I-frames. Test use only.
    pub fn set_skip_frame_check(&mut self, skip: bool) {
        self.sequencer.set_skip_validation(skip);
    }

    // Connection state

    pub fn connection_state(&self) -> ConnectionState {
        self.connection_state
    }

    /// Record that a layer got connected
    ///
    /// Connecting the HDLC layer starts a fresh frame sequence.
    pub fn mark_connected(&mut self, state: ConnectionState) {
        if state.contains(ConnectionState::HDLC) {
            self.reset_frame_sequence();
        }
        self.connection_state.insert(state);
        log::debug!(
            "Connection state: 0x{:02X}",
            self.connection_state.bits()
        );
    }

    /// Drop every connection flag and restart sequence and block numbering
    pub fn mark_disconnected(&mut self) {
        self.connection_state = ConnectionState::NONE;
        self.reset_frame_sequence();
        self.reset_block_index();
        self.negotiated_conformance = Conformance::EMPTY;
    }

    pub fn allow_anonymous_access(&self) -> bool {
        self.allow_anonymous_access
    }

    pub fn set_allow_anonymous_access(&mut self, allow: bool) {
        self.allow_anonymous_access = allow;
    }

    /// Whether requests may be served on this connection
    pub fn accept_connection(&self) -> bool {
        !self.connection_state.is_none() || self.allow_anonymous_access
    }

    // Addressing

    pub fn client_address(&self) -> u16 {
        self.client_address
    }

    pub fn set_client_address(&mut self, address: u16) {
        self.client_address = address;
    }

    pub fn server_address(&self) -> u32 {
        self.server_address
    }

    pub fn set_server_address(&mut self, address: u32) {
        self.server_address = address;
    }

    pub fn server_address_size(&self) -> u8 {
        self.server_address_size
    }

    pub fn set_server_address_size(&mut self, size: u8) {
        self.server_address_size = size;
    }

    pub fn interface_type(&self) -> InterfaceType {
        self.interface_type
    }

    pub fn set_interface_type(&mut self, interface_type: InterfaceType) {
        self.interface_type = interface_type;
    }

    // Authentication

    pub fn authentication(&self) -> Authentication {
        self.authentication
    }

    pub fn set_authentication(&mut self, authentication: Authentication) {
        self.authentication = authentication;
    }

    pub fn password(&self) -> Option<&[u8]> {
        self.password.as_deref()
    }

    pub fn set_password(&mut self, password: Option<Vec<u8>>) {
        self.password = password;
    }

    pub fn custom_challenges(&self) -> bool {
        self.custom_challenges
    }

    /// Keep user supplied challenges instead of generated ones
    pub fn set_custom_challenges(&mut self, custom: bool) {
        self.custom_challenges = custom;
    }

    /// Client to server challenge
    pub fn ctos_challenge(&self) -> Option<&[u8]> {
        self.ctos_challenge.as_deref()
    }

    /// Set the client to server challenge
    ///
    /// With custom challenges enabled an existing challenge is kept.
    pub fn set_ctos_challenge(&mut self, challenge: Vec<u8>) {
        if !self.custom_challenges || self.ctos_challenge.is_none() {
            self.ctos_challenge = Some(challenge);
        }
    }

    /// Server to client challenge
    pub fn stoc_challenge(&self) -> Option<&[u8]> {
        self.stoc_challenge.as_deref()
    }

    /// Set the server to client challenge
    ///
    /// With custom challenges enabled an existing challenge is kept.
    pub fn set_stoc_challenge(&mut self, challenge: Vec<u8>) {
        if !self.custom_challenges || self.stoc_challenge.is_none() {
            self.stoc_challenge = Some(challenge);
        }
    }

    pub fn source_system_title(&self) -> Option<&[u8; SYSTEM_TITLE_LENGTH]> {
        self.source_system_title.as_ref()
    }

    pub fn set_source_system_title(&mut self, title: &[u8]) -> DlmsResult<()> {
        let title: [u8; SYSTEM_TITLE_LENGTH] = title.try_into().map_err(|_| {
            DlmsError::InvalidData(format!(
                "Invalid system title: expected {} bytes, got {}",
                SYSTEM_TITLE_LENGTH,
                title.len()
            ))
        })?;
        self.source_system_title = Some(title);
        Ok(())
    }

    // Invoke id

    pub fn invoke_id(&self) -> u8 {
        self.invoke_id
    }

    pub fn set_invoke_id(&mut self, invoke_id: u8) -> DlmsResult<()> {
        if invoke_id > 0x0F {
            return Err(DlmsError::InvalidData(format!(
                "Invalid invoke id: {}, must be 0-15",
                invoke_id
            )));
        }
        self.invoke_id = invoke_id;
        Ok(())
    }

    /// Take over invoke id, priority and service class from a received
    /// invoke-id-and-priority byte
    pub fn update_invoke_id(&mut self, value: u8) {
        self.priority = if value & 0x80 != 0 {
            Priority::High
        } else {
            Priority::Normal
        };
        self.service_class = if value & 0x40 != 0 {
            ServiceClass::Confirmed
        } else {
            ServiceClass::UnConfirmed
        };
        self.invoke_id = value & 0x0F;
    }

    pub fn long_invoke_id(&self) -> u32 {
        self.long_invoke_id
    }

    pub fn set_long_invoke_id(&mut self, invoke_id: u64) -> DlmsResult<()> {
        self.long_invoke_id = u32::try_from(invoke_id).map_err(|_| {
            DlmsError::InvalidData(format!(
                "Invalid long invoke id: {}, must fit in 32 bits",
                invoke_id
            ))
        })?;
        Ok(())
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    pub fn service_class(&self) -> ServiceClass {
        self.service_class
    }

    pub fn set_service_class(&mut self, service_class: ServiceClass) {
        self.service_class = service_class;
    }

    // Association parameters

    pub fn use_logical_name_referencing(&self) -> bool {
        self.use_logical_name_referencing
    }

    /// Switch between Logical Name and Short Name referencing
    ///
    /// The proposed conformance is recomputed only when the value changes.
    pub fn set_use_logical_name_referencing(&mut self, value: bool) {
        if self.use_logical_name_referencing != value {
            self.use_logical_name_referencing = value;
            self.proposed_conformance = Conformance::initial(value);
        }
    }

    pub fn proposed_conformance(&self) -> Conformance {
        self.proposed_conformance
    }

    pub fn set_proposed_conformance(&mut self, conformance: Conformance) {
        self.proposed_conformance = conformance;
    }

    pub fn negotiated_conformance(&self) -> Conformance {
        self.negotiated_conformance
    }

    pub fn set_negotiated_conformance(&mut self, conformance: Conformance) {
        self.negotiated_conformance = conformance;
    }

    pub fn dlms_version(&self) -> u8 {
        self.dlms_version
    }

    pub fn set_dlms_version(&mut self, version: u8) {
        self.dlms_version = version;
    }

    pub fn max_pdu_size(&self) -> u16 {
        self.max_pdu_size
    }

    pub fn set_max_pdu_size(&mut self, size: u16) {
        self.max_pdu_size = size;
    }

    pub fn max_server_pdu_size(&self) -> u16 {
        self.max_server_pdu_size
    }

    pub fn set_max_server_pdu_size(&mut self, size: u16) {
        self.max_server_pdu_size = size;
    }

    pub fn quality_of_service(&self) -> u8 {
        self.quality_of_service
    }

    pub fn set_quality_of_service(&mut self, qos: u8) {
        self.quality_of_service = qos;
    }

    pub fn standard(&self) -> Standard {
        self.standard
    }

    pub fn set_standard(&mut self, standard: Standard) {
        self.standard = standard;
    }

    pub fn use_utc_to_normal_time(&self) -> bool {
        self.use_utc_to_normal_time
    }

    pub fn set_use_utc_to_normal_time(&mut self, value: bool) {
        self.use_utc_to_normal_time = value;
    }

    /// User id sent in the AARQ, `None` when not used
    pub fn user_id(&self) -> Option<u8> {
        self.user_id
    }

    pub fn set_user_id(&mut self, user_id: Option<u8>) {
        self.user_id = user_id;
    }

    // Block transfer

    pub fn window_size(&self) -> u8 {
        self.window_size
    }

    pub fn set_window_size(&mut self, size: u8) {
        self.window_size = size;
    }

    /// First block index used in block transfer
    ///
    /// One based by default, some meters count from zero.
    pub fn starting_packet_index(&self) -> u32 {
        self.starting_packet_index
    }

    pub fn set_starting_packet_index(&mut self, index: u32) {
        self.starting_packet_index = index;
        self.reset_block_index();
    }

    pub fn block_index(&self) -> u32 {
        self.block_index
    }

    pub fn set_block_index(&mut self, index: u32) {
        self.block_index = index;
    }

    pub fn increase_block_index(&mut self) {
        self.block_index = self.block_index.wrapping_add(1);
    }

    pub fn reset_block_index(&mut self) {
        self.block_index = self.starting_packet_index;
        self.block_number_ack = 0;
    }

    /// Block number acknowledged in general block transfer
    pub fn block_number_ack(&self) -> u16 {
        self.block_number_ack
    }

    pub fn set_block_number_ack(&mut self, value: u16) {
        self.block_number_ack = value;
    }

    /// Number of items in a long data transfer
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn set_count(&mut self, count: u32) {
        self.count = count;
    }

    /// Position in a long data transfer
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn set_index(&mut self, index: u32) {
        self.index = index;
    }
}

impl Default for DlmsSettings {
    fn default() -> Self {
        Self::new(Role::Client)
    }
}
