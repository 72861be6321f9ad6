//! Strike device trait definition.
//!
//! Uses native `async fn` in traits (Edition 2024 RPITIT). Use generics or
//! [`AnyStrike`](crate::devices::AnyStrike) for backend selection.

#![allow(async_fn_in_trait)]

/// Something that can open the door.
///
/// `strike` is fire-and-forget: backends log their own failures and never
/// report them to the caller, so a faulty actuator cannot stop the gate.
pub trait StrikeDevice: Send {
    /// Fire the door strike once.
    async fn strike(&mut self);

    /// Short human-readable name of the backend, for logs.
    fn name(&self) -> &str;
}
