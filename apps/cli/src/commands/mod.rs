pub mod launch;
pub mod maintenance;
pub mod settings;
pub mod versions;
