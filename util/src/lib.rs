pub mod repl;

use anyhow::anyhow;
pub trait ResultExt<T> {
    /// Erases a non-`'static` or non-`Error` error into its `Debug` form.
    fn staticalize(self) -> anyhow::Result<T>;
}
impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    fn staticalize(self) -> anyhow::Result<T> {
        self.map_err(|e| anyhow!("{e:?}"))
    }
}
