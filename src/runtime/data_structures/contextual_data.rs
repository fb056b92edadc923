/// Marks and releases scopes of data held by the interpreter.  Releasing a scope frees all of the
/// data added since the matching mark.
///
/// Scopes act as a stack, the most recently marked scope is the first one released.  The outermost
/// scope is never released.
pub trait ContextualData {
    /// Open a new scope.  Data added after this point is freed by the matching release_context.
    fn mark_context(&mut self);

    /// Release the innermost scope and everything declared in it.
    fn release_context(&mut self);
}
