use std::path::{Path, PathBuf};

const DATA_DIR: &str = "data";
const DATABASE_FILE: &str = "trivia.db";

/// 可执行文件所在目录下的 data 目录
pub fn get_app_data_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR)
}

pub fn default_database_path() -> PathBuf {
    get_app_data_dir().join(DATABASE_FILE)
}
