// 服务模块
// 提供核心业务逻辑服务

pub mod database;
pub mod pagination;
pub mod quiz;

pub use database::{Category, DatabaseError, DatabaseService, DbResult, NewQuestion, Question};

pub use pagination::{paginate, QUESTIONS_PER_PAGE};

pub use quiz::select_unseen;
