use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// 列表接口固定的每页大小
pub const PAGE_SIZE: u32 = 10;

/// 分页查询信息
///
/// 每页大小固定为 [`PAGE_SIZE`]，用户只能指定页码
#[derive(Deserialize, Debug, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    #[param(example = 1, minimum = 1)]
    #[validate(range(min = 1))]
    /// 分页查询的开始页数，默认第1页
    pub page: Option<u32>,
}

impl PageQuery {
    pub fn page_index(&self) -> u32 {
        self.page.unwrap_or(1)
    }
}

/// 封装符合json-api的单个返回对象
///
/// 具体参考：<https://jsonapi.org>
#[derive(Deserialize, Debug, ToSchema, Serialize)]
pub struct Reply<T> {
    pub data: T,
}

/// 封装符合json-api的列表对象
#[derive(Deserialize, Debug, ToSchema, Serialize)]
pub struct ReplyList<T> {
    pub data: Vec<T>,
    #[schema(example = 146)]
    /// 分页查询总数
    pub total: u64,

    #[schema(example = 10)]
    /// 分页查询的每页大小
    pub page_size: u32,

    #[schema(example = 1)]
    /// 分页查询的开始页数
    pub page_index: u32,

    #[schema(example = 15)]
    /// 最后一页的页数，没有数据时为1
    pub last_page: u32,
}

impl<T> ReplyList<T> {
    pub fn new(data: Vec<T>, total: u64, page_index: u32, page_size: u32) -> Self {
        let last_page = total.div_ceil(u64::from(page_size.max(1))).max(1);
        Self {
            data,
            total,
            page_size,
            page_index,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
        }
    }
}
