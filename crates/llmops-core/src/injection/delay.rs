use std::time::Duration;

use async_trait::async_trait;

/// Espera simulada entre `Running` y el resultado de un step. Es el único
/// punto de suspensión del runner.
#[async_trait]
pub trait Delay: Send + Sync + std::fmt::Debug {
    async fn sleep(&self, duration: Duration);
}

/// Espera real con el timer de tokio.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// No espera; sólo cede el control una vez para que otras tareas avancen.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn sleep(&self, _duration: Duration) {
        tokio::task::yield_now().await;
    }
}
