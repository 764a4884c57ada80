use crate::controller::{SpiderError, Spiderfier};
use crate::surface::ProxySurface;

impl<T, S: ProxySurface> Spiderfier<T, S> {
    /// Drives the timeline in real time on the current task until no deferred
    /// work is left. Meant for a current-thread runtime or a `LocalSet`; the
    /// controller is not shared across threads.
    pub async fn run_until_idle(&mut self) -> Result<(), SpiderError<S::Error>> {
        while let Some(due) = self.next_due() {
            let wait = due.saturating_sub(self.now());
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
            self.advance_to(due)?;
        }
        Ok(())
    }
}
