// 分页模块

/// 每页题目数
pub const QUESTIONS_PER_PAGE: usize = 10;

/// 取第 `page` 页（从 1 开始），越界时返回空切片
pub fn paginate<T>(items: &[T], page: u32) -> &[T] {
    let page = page.max(1) as usize;
    let start = (page - 1).saturating_mul(QUESTIONS_PER_PAGE).min(items.len());
    let end = start.saturating_add(QUESTIONS_PER_PAGE).min(items.len());
    &items[start..end]
}
