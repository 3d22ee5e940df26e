/// 未命中任何关键字时使用的分类
pub const DEFAULT_CATEGORY: &str = "other";

/// 按顺序匹配，先命中者生效
const CATEGORY_KEYWORDS: [&str; 5] = ["bus", "train", "flight", "hotel", "payment"];

/// 根据任务名称中的关键字推断分类
pub fn assign_category(job_name: &str) -> &'static str {
    CATEGORY_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| job_name.contains(keyword))
        .unwrap_or(DEFAULT_CATEGORY)
}
