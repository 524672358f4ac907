// HTTP 处理模块
// 把路由映射到数据库服务、分页与抽题逻辑

pub mod categories;
pub mod questions;
pub mod quizzes;

use crate::errors::ApiError;
use crate::services::DatabaseService;

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseService,
}

impl AppState {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }
}

/// 未匹配的路由
pub async fn fallback() -> ApiError {
    ApiError::not_found()
}

/// 路径存在但方法不匹配
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}
