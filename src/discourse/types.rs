//! Wire shapes of the endpoints the client reads. Only the fields the banner
//! needs are declared; everything else in the payloads is ignored.
use serde::Deserialize;

use crate::program::Category;
use crate::session::{CurrentUser, TopicRecord, UserWatchState};
use crate::util::strip_control_chars;

#[derive(Debug, Deserialize)]
pub(crate) struct SessionResponse {
    pub current_user: UserDto,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserDto {
    pub username: String,
    #[serde(default)]
    pub watched_category_ids: Vec<i64>,
    #[serde(default)]
    pub watched_first_post_category_ids: Vec<i64>,
}

impl From<UserDto> for CurrentUser {
    fn from(dto: UserDto) -> Self {
        CurrentUser {
            username: strip_control_chars(&dto.username).into_owned(),
            watch_state: UserWatchState {
                watched_first_post_category_ids: dto
                    .watched_first_post_category_ids
                    .into_iter()
                    .collect(),
                watched_category_ids: dto.watched_category_ids.into_iter().collect(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopicDto {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category_id: Option<i64>,
}

impl From<TopicDto> for TopicRecord {
    fn from(dto: TopicDto) -> Self {
        TopicRecord {
            id: dto.id,
            title: strip_control_chars(&dto.title).into_owned(),
            category_id: dto.category_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SiteResponse {
    #[serde(default)]
    pub categories: Vec<CategoryDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub parent_category_id: Option<i64>,
}

impl From<CategoryDto> for Category {
    fn from(dto: CategoryDto) -> Self {
        Category::new(
            dto.id,
            strip_control_chars(&dto.name),
            dto.parent_category_id,
        )
    }
}
