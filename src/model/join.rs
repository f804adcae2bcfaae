//! Many-to-many link tables between movie and actor/genre/director.

use super::{ColumnDef, Entity, EntityDef, KeyShape, UpdateStrategy};
use serde::{Deserialize, Serialize};

pub const MOVIE_ACTOR: EntityDef = EntityDef {
    table: "movie_actor",
    path: "movie_actor",
    key: KeyShape::Composite("movie_id", "actor_id"),
    columns: &[
        ColumnDef::plain("movie_id", "int4"),
        ColumnDef::plain("actor_id", "int4"),
        ColumnDef::created_at(),
    ],
    children: &[],
    update: UpdateStrategy::Replace,
};

pub const MOVIE_GENRE: EntityDef = EntityDef {
    table: "movie_genre",
    path: "movie_genre",
    key: KeyShape::Composite("movie_id", "genre_id"),
    columns: &[
        ColumnDef::plain("movie_id", "int4"),
        ColumnDef::plain("genre_id", "int4"),
        ColumnDef::created_at(),
    ],
    children: &[],
    update: UpdateStrategy::Replace,
};

pub const MOVIE_DIRECTOR: EntityDef = EntityDef {
    table: "movie_director",
    path: "movie_director",
    key: KeyShape::Composite("movie_id", "director_id"),
    columns: &[
        ColumnDef::plain("movie_id", "int4"),
        ColumnDef::plain("director_id", "int4"),
        ColumnDef::created_at(),
    ],
    children: &[],
    update: UpdateStrategy::Replace,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MovieActorItem {
    pub movie_id: i64,
    pub actor_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MovieGenreItem {
    pub movie_id: i64,
    pub genre_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MovieDirectorItem {
    pub movie_id: i64,
    pub director_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

created_at_field!(MovieActorItem, MovieGenreItem, MovieDirectorItem);

pub struct MovieActor;
pub struct MovieGenre;
pub struct MovieDirector;

impl Entity for MovieActor {
    const DEF: &'static EntityDef = &MOVIE_ACTOR;
    type Payload = MovieActorItem;
    type Id = (i64, i64);
}

impl Entity for MovieGenre {
    const DEF: &'static EntityDef = &MOVIE_GENRE;
    type Payload = MovieGenreItem;
    type Id = (i64, i64);
}

impl Entity for MovieDirector {
    const DEF: &'static EntityDef = &MOVIE_DIRECTOR;
    type Payload = MovieDirectorItem;
    type Id = (i64, i64);
}
