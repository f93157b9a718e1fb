/// One way of deriving a field from an input; `None` means "try the next one".
pub type Strategy<'s, I, T> = &'s dyn Fn(&I) -> Option<T>;

/// Runs `strategies` in order and returns the first value produced.
pub fn first_success<I, T>(input: &I, strategies: &[Strategy<'_, I, T>]) -> Option<T> {
    strategies.iter().find_map(|strategy| strategy(input))
}
