//! Entity routes, built from each entity's descriptor.
//! `/{entity}/{entity}s`, `/{entity}/create`, `/{entity}/exact|like|in`, and the id route:
//! `/{entity}/:id`, or `/{entity}/:movie_id/:other_id` for composite keys.

use crate::handlers::entity::{
    create, delete as delete_handler, delete_by_movie, list, read, search_exact, search_in,
    search_like, update,
};
use crate::model::{
    Actor, Director, Entity, Genre, KeyShape, Movie, MovieActor, MovieDirector, MovieGenre,
    MovieReview,
};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

pub fn entity_routes<E: Entity>() -> Router<AppState> {
    let def = E::DEF;
    let base = format!("/{}", def.path);
    let id_route = match def.key {
        KeyShape::Single(_) => format!("{}/:id", base),
        KeyShape::Composite(..) => format!("{}/:movie_id/:other_id", base),
    };
    let router = Router::new()
        .route(&format!("{}/{}", base, def.collection()), get(list::<E>))
        .route(&format!("{}/create", base), post(create::<E>))
        .route(&format!("{}/exact", base), post(search_exact::<E>))
        .route(&format!("{}/like", base), post(search_like::<E>))
        .route(&format!("{}/in", base), post(search_in::<E>))
        .route(
            &id_route,
            get(read::<E>).put(update::<E>).delete(delete_handler::<E>),
        );
    // Tables hanging off a movie can be cleared for that movie in one call.
    if matches!(def.key, KeyShape::Composite(..)) {
        return router.route(&format!("{}/movie/:movie_id", base), delete(delete_by_movie::<E>));
    }
    router
}

/// Routes for every entity, unprefixed.
pub fn all_entity_routes() -> Router<AppState> {
    Router::new()
        .merge(entity_routes::<Movie>())
        .merge(entity_routes::<Actor>())
        .merge(entity_routes::<Director>())
        .merge(entity_routes::<Genre>())
        .merge(entity_routes::<MovieReview>())
        .merge(entity_routes::<MovieActor>())
        .merge(entity_routes::<MovieGenre>())
        .merge(entity_routes::<MovieDirector>())
}
