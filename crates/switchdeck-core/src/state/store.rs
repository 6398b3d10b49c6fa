use super::events::Event;
use super::types::Command;

/// Trait for dispatching commands.
///
/// Hosts (CLI, GUI bridge) hold an implementation and route every request
/// through it.
///
/// # Semantics
///
/// - **Ordering**: commands run in the order received. Overlapping theme
///   activations are not serialized here; hosts that need strict ordering
///   must queue them.
/// - **Error handling**: errors distinguish user errors (unknown theme, empty
///   protected set) from system errors (save failures).
/// - **Events**: on success, dispatch returns a non-empty `Vec<Event>`.
pub trait Store {
    type Error;
    fn dispatch(&mut self, cmd: Command) -> Result<Vec<Event>, Self::Error>;
}
