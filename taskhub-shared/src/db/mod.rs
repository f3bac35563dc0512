/// Database access layer
///
/// - `pool`: connection pool creation and health checks
/// - `migrations`: startup migration runner

pub mod migrations;
pub mod pool;
