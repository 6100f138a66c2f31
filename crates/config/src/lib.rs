//! Configuration: schema, file discovery and loading.

mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    env_subst::substitute_env,
    loader::{
        clear_config_dir, config_dir, discover_and_load, find_or_default_config_path, load_config,
        set_config_dir,
    },
    schema::{AuthConfig, PlazaConfig, SessionConfig},
};
