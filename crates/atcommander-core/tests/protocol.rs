//! End-to-end engine behaviour against a scripted transport

use atcommander_core::protocol::{
    AtCommander, BaudSequencer, CommandKind, ConnectionState, MockTransport, ProtocolError,
    RetryPolicy, SessionMode, CANDIDATE_BAUD_RATES, MAX_RETRIES, RN42, XBEE,
};

fn setup() -> (AtCommander, ConnectionState) {
    (AtCommander::new(RN42), ConnectionState::new(9600))
}

mod enter_command_mode {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_enter_command_mode_success() {
        let (commander, mut state) = setup();
        let mut mock = MockTransport::with_response(b"CMD\r\n");

        assert!(!state.connected);
        assert!(commander.enter_command_mode(&mut mock, &mut state).is_ok());
        assert!(state.connected);
        assert_eq!(state.mode(), SessionMode::CommandMode);
        assert_eq!(state.host_baud, CANDIDATE_BAUD_RATES[0]);
        assert_eq!(mock.written_text(), "$$$");
    }

    #[test]
    fn test_enter_command_mode_already_active() {
        let (commander, mut state) = setup();
        let mut mock = MockTransport::with_response(b"CMD\r\n");
        state.connected = true;

        assert!(commander.enter_command_mode(&mut mock, &mut state).is_ok());
        assert!(state.connected);
        assert!(mock.is_untouched());
    }

    #[test]
    fn test_enter_command_mode_fail_bad_response() {
        let (commander, mut state) = setup();
        let mut mock = MockTransport::with_response(b"BAD\r\n");

        let err = commander
            .enter_command_mode(&mut mock, &mut state)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::NotConnected));
        assert!(!state.connected);
        assert_eq!(mock.bauds, CANDIDATE_BAUD_RATES.to_vec());
    }

    #[test]
    fn test_enter_command_mode_fail_no_response() {
        let (commander, mut state) = setup();
        let mut mock = MockTransport::new();

        assert!(commander.enter_command_mode(&mut mock, &mut state).is_err());
        assert!(!state.connected);

        let candidates = CANDIDATE_BAUD_RATES.len();
        assert_eq!(mock.bauds.len(), candidates);
        assert_eq!(mock.read_attempts, candidates * MAX_RETRIES as usize);
        assert_eq!(mock.written_text(), "$$$".repeat(candidates));
    }

    #[test]
    fn test_enter_command_mode_after_garbage() {
        // The first two candidates read garbage, the third gets the token
        let (commander, mut state) = setup();
        let mut mock = MockTransport::with_response(b"BADAAACMD\r\n");

        assert!(commander.enter_command_mode(&mut mock, &mut state).is_ok());
        assert!(state.connected);
        assert_eq!(mock.bauds, CANDIDATE_BAUD_RATES[..3].to_vec());
        assert_eq!(state.host_baud, CANDIDATE_BAUD_RATES[2]);
    }

    #[test]
    fn test_enter_command_mode_at_each_baud() {
        for (index, &baud) in CANDIDATE_BAUD_RATES.iter().enumerate() {
            let (commander, mut state) = setup();
            let mut mock = MockTransport::new();
            mock.respond_at_baud(baud, b"CMD\r\n");

            assert!(
                commander.enter_command_mode(&mut mock, &mut state).is_ok(),
                "failed to enter command mode at {}",
                baud
            );
            assert!(state.connected);
            assert_eq!(state.host_baud, baud);
            // Later candidates are never tried
            assert_eq!(mock.bauds, CANDIDATE_BAUD_RATES[..=index].to_vec());
        }
    }

    #[test]
    fn test_enter_command_mode_skips_unusable_host_baud() {
        let (commander, mut state) = setup();
        let mut mock = MockTransport::new();
        mock.reject_baud(230400);
        mock.respond_at_baud(115200, b"CMD\r\n");

        assert!(commander.enter_command_mode(&mut mock, &mut state).is_ok());
        assert_eq!(state.host_baud, 115200);
        assert_eq!(mock.bauds, vec![115200]);
    }

    #[test]
    fn test_enter_command_mode_custom_sequence() {
        let commander = AtCommander::new(RN42).with_bauds(BaudSequencer::new(vec![57600, 9600]));
        let mut state = ConnectionState::new(9600);
        let mut mock = MockTransport::new();
        mock.respond_at_baud(9600, b"CMD\r\n");

        assert!(commander.enter_command_mode(&mut mock, &mut state).is_ok());
        assert_eq!(mock.bauds, vec![57600, 9600]);
        assert_eq!(state.host_baud, 9600);
    }

    #[test]
    fn test_enter_command_mode_retry_budget() {
        let commander = AtCommander::new(RN42)
            .with_bauds(BaudSequencer::new(vec![9600]))
            .with_retry_policy(RetryPolicy {
                max_retries: 1,
                retry_delay_ms: 5,
            });
        let mut state = ConnectionState::new(9600);
        let mut mock = MockTransport::new();

        assert!(commander.enter_command_mode(&mut mock, &mut state).is_err());
        assert_eq!(mock.delays, vec![RN42.response_delay_ms, 5]);
    }
}

mod exit_command_mode {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_exit_command_mode_success() {
        let (commander, mut state) = setup();
        let mut mock = MockTransport::with_response(b"END\r\n");
        state.connected = true;

        assert!(commander.exit_command_mode(&mut mock, &mut state).is_ok());
        assert!(!state.connected);
        assert_eq!(mock.written_text(), "---\r");
    }

    #[test]
    fn test_exit_command_mode_fail_bad_response() {
        let (commander, mut state) = setup();
        let mut mock = MockTransport::with_response(b"CMD");
        state.connected = true;

        assert!(commander.exit_command_mode(&mut mock, &mut state).is_err());
        assert!(state.connected);
    }

    #[test]
    fn test_exit_command_mode_fail_no_response() {
        let (commander, mut state) = setup();
        let mut mock = MockTransport::new();
        state.connected = true;

        assert!(commander.exit_command_mode(&mut mock, &mut state).is_err());
        assert!(state.connected);
    }

    #[test]
    fn test_exit_command_mode_already_done() {
        let (commander, mut state) = setup();
        let mut mock = MockTransport::new();

        assert!(commander.exit_command_mode(&mut mock, &mut state).is_ok());
        assert!(!state.connected);
        assert!(mock.is_untouched());
    }

    #[test]
    fn test_exit_unsupported_on_xbee() {
        let commander = AtCommander::new(XBEE);
        let mut state = ConnectionState::new(9600);
        state.connected = true;
        let mut mock = MockTransport::with_response(b"OK\r\n");

        let err = commander
            .exit_command_mode(&mut mock, &mut state)
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::UnsupportedOperation(CommandKind::ExitCommandMode)
        ));
        assert!(state.connected);
    }
}

mod set_baud {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_baud_success() {
        let (commander, mut state) = setup();
        let mut mock = MockTransport::with_response(b"CMD\r\nAOK\r\n");

        assert!(!state.connected);
        assert!(commander.set_baud(&mut mock, &mut state, 115200).is_ok());
        assert!(state.connected);
        assert_eq!(state.device_baud, 115200);
        assert_eq!(mock.written_text(), "$$$SU,11\r");
    }

    #[test]
    fn test_set_baud_bad_response() {
        let (commander, mut state) = setup();
        let mut mock = MockTransport::with_response(b"CMD\r\n?");

        assert!(!state.connected);
        assert_ne!(state.device_baud, 115200);
        assert!(commander.set_baud(&mut mock, &mut state, 115200).is_err());
        assert!(state.connected);
        assert_ne!(state.device_baud, 115200);
    }

    #[test]
    fn test_set_baud_no_response() {
        let (commander, mut state) = setup();
        let mut mock = MockTransport::with_response(b"CMD\r\n");

        assert!(commander.set_baud(&mut mock, &mut state, 115200).is_err());
        assert!(state.connected);
        assert_ne!(state.device_baud, 115200);
    }

    #[test]
    fn test_set_baud_without_command_mode() {
        let (commander, mut state) = setup();
        let mut mock = MockTransport::new();

        let err = commander
            .set_baud(&mut mock, &mut state, 115200)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::NotConnected));
        assert!(!mock.written_text().contains("SU,"));
        assert_eq!(state.device_baud, 9600);
    }

    #[test]
    fn test_ensure_baud_reboots_rn42() {
        let (commander, mut state) = setup();
        let mut mock = MockTransport::with_response(b"CMD\r\nAOK\r\nReboot!\r\n");

        assert!(commander.ensure_baud(&mut mock, &mut state, 115200).is_ok());
        assert_eq!(mock.written_text(), "$$$SU,11\rR,1\r");
        assert_eq!(state.device_baud, 115200);
        assert!(!state.connected);
    }

    #[test]
    fn test_ensure_baud_xbee_has_no_reboot() {
        let commander = AtCommander::new(XBEE);
        let mut state = ConnectionState::new(9600);
        let mut mock = MockTransport::with_response(b"OKOK\r\nOK\r\n");

        assert!(commander.ensure_baud(&mut mock, &mut state, 57600).is_ok());
        assert_eq!(mock.written_text(), "+++ATBD 6\r\nATWR\r\n");
        assert_eq!(state.device_baud, 57600);
        assert!(state.connected);
    }
}

mod reboot {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reboot_success() {
        let (commander, mut state) = setup();
        let mut mock = MockTransport::with_response(b"CMD\r\nReboot!\r\n");

        assert!(commander.reboot(&mut mock, &mut state).is_ok());
        assert!(!state.connected);
        assert_eq!(mock.written_text(), "$$$R,1\r");
    }

    #[test]
    fn test_reboot_needs_command_mode() {
        let (commander, mut state) = setup();
        let mut mock = MockTransport::new();

        let err = commander.reboot(&mut mock, &mut state).unwrap_err();
        assert!(matches!(err, ProtocolError::NotConnected));
        assert!(!mock.written_text().contains("R,1"));
    }

    #[test]
    fn test_reboot_bad_response_keeps_state() {
        let (commander, mut state) = setup();
        state.connected = true;
        let mut mock = MockTransport::with_response(b"ERR\r\n");

        assert!(commander.reboot(&mut mock, &mut state).is_err());
        assert!(state.connected);
    }
}

mod configuration {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_configuration_timer() {
        let (commander, mut state) = setup();
        let mut mock = MockTransport::with_response(b"CMD\r\nAOK\r\n");

        assert!(commander
            .set_configuration_timer(&mut mock, &mut state, 255)
            .is_ok());
        assert_eq!(mock.written_text(), "$$$ST,255\r");
    }

    #[test]
    fn test_set_name() {
        let (commander, mut state) = setup();
        state.connected = true;
        let mut mock = MockTransport::with_response(b"AOK\r\n");

        assert!(commander
            .set_name(&mut mock, &mut state, "OpenXC-VI", false)
            .is_ok());
        assert_eq!(mock.written_text(), "SN,OpenXC-VI\r");
    }

    #[test]
    fn test_set_serialized_name() {
        let (commander, mut state) = setup();
        state.connected = true;
        let mut mock = MockTransport::with_response(b"AOK\r\n");

        assert!(commander
            .set_name(&mut mock, &mut state, "OpenXC-VI", true)
            .is_ok());
        assert_eq!(mock.written_text(), "S-,OpenXC-VI\r");
    }

    #[test]
    fn test_serialized_name_unsupported_on_xbee() {
        let commander = AtCommander::new(XBEE);
        let mut state = ConnectionState::new(9600);
        let mut mock = MockTransport::with_response(b"OK");

        let err = commander
            .set_name(&mut mock, &mut state, "node", true)
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::UnsupportedOperation(CommandKind::SetSerializedName)
        ));
        assert!(mock.is_untouched());
    }

    #[test]
    fn test_name_too_long() {
        let (commander, mut state) = setup();
        state.connected = true;
        let mut mock = MockTransport::new();
        let name = "x".repeat(100);

        let err = commander
            .set_name(&mut mock, &mut state, &name, false)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::RequestTooLarge { .. }));
        assert!(mock.written.is_empty());
    }

    #[test]
    fn test_name_cannot_smuggle_second_command() {
        let (commander, mut state) = setup();
        state.connected = true;
        let mut mock = MockTransport::with_response(b"AOK\r\n");

        let err = commander
            .set_name(&mut mock, &mut state, "x\rSU,92", false)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidFormat(_)));
        assert!(mock.is_untouched());
    }

    #[test]
    fn test_get_name() {
        let (commander, mut state) = setup();
        let mut mock = MockTransport::with_response(b"CMD\r\nFireFly-ABCD\r\n");
        let mut buffer = [0u8; 32];

        let length = commander
            .get_name(&mut mock, &mut state, &mut buffer)
            .unwrap();
        assert_eq!(&buffer[..length], b"FireFly-ABCD");
        assert_eq!(mock.written_text(), "$$$GN\r");
    }

    #[test]
    fn test_get_device_id_error() {
        let (commander, mut state) = setup();
        state.connected = true;
        let mut mock = MockTransport::with_response(b"ERR\r\n");
        let mut buffer = [0u8; 32];

        let err = commander
            .get_device_id(&mut mock, &mut state, &mut buffer)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::KnownErrorResponse(_)));
        assert!(state.connected);
    }

    #[test]
    fn test_xbee_get_device_id() {
        let commander = AtCommander::new(XBEE);
        let mut state = ConnectionState::new(9600);
        let mut mock = MockTransport::with_response(b"OK\r\n40A1B2C3\r\n");
        let mut buffer = [0u8; 16];

        let length = commander
            .get_device_id(&mut mock, &mut state, &mut buffer)
            .unwrap();
        assert_eq!(&buffer[..length], b"40A1B2C3");
        assert_eq!(mock.written_text(), "+++ATSL\r\n");
    }
}

mod xbee {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_xbee_enter_command_mode_success() {
        let commander = AtCommander::new(XBEE);
        let mut state = ConnectionState::new(9600);
        let mut mock = MockTransport::with_response(b"OK");

        assert!(!state.connected);
        assert!(commander.enter_command_mode(&mut mock, &mut state).is_ok());
        assert!(state.connected);
        assert_eq!(mock.delays, vec![XBEE.response_delay_ms]);
    }

    #[test]
    fn test_xbee_store_settings() {
        let commander = AtCommander::new(XBEE);
        let mut state = ConnectionState::new(9600);
        state.connected = true;
        let mut mock = MockTransport::with_response(b"OK\r\n");

        assert!(commander.store_settings(&mut mock, &state).is_ok());
        assert_eq!(mock.written_text(), "ATWR\r\n");
    }
}
