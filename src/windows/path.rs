use std::env::var_os;
use std::path::PathBuf;

pub fn env_init_file() -> Option<PathBuf> {
    var_os("INPUTRC").map(PathBuf::from)
}

pub fn system_init_file() -> Option<PathBuf> {
    None
}

pub fn user_init_file(application: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(application).join("inputrc"))
}
