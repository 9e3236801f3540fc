mod round_state_machine;

pub use round_state_machine::{
    Resolution, Round, RoundSignal, RoundState, RoundTiming, RoundTransition,
};
