// 启动配置：命令行参数，环境变量兜底

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::utils;

#[derive(Debug, Clone, Parser)]
#[command(name = "trivia-api", version, about = "Trivia question bank REST backend")]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "TRIVIA_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// SQLite database file (defaults to data/trivia.db beside the executable)
    #[arg(long, env = "TRIVIA_DATABASE")]
    pub database: Option<PathBuf>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long, env = "TRIVIA_LOG", default_value = "info")]
    pub log_level: log::LevelFilter,

    /// Insert the default categories when the category table is empty
    #[arg(long, env = "TRIVIA_SEED_CATEGORIES")]
    pub seed_categories: bool,
}

impl Config {
    pub fn database_path(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(utils::default_database_path)
    }
}
