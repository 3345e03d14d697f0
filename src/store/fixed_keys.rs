pub trait FixedKeys {
    const CHAIN_STATE_KEY: &'static [u8] = "chain_state".as_bytes();
    const CORE_STATE_KEY: &'static [u8] = "core_state".as_bytes();
    const SCHEDULE_DELEGATE_KEY: &'static [u8] = "schedule_delegate".as_bytes();
}
