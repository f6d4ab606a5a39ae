use crate::common::state::AppState;
use crate::{operators, readings, stations};
use axum::Router;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

pub fn build_router(state: &AppState) -> Router {
    #[derive(OpenApi)]
    #[openapi(
        modifiers(&SecurityAddon),
        tags(
            (name = "operators", description = "Operator login"),
            (name = "stations", description = "Station registration and ownership-scoped management"),
            (name = "readings", description = "Reading ingestion and time-filtered queries")
        )
    )]
    struct ApiDoc;

    struct SecurityAddon;

    impl utoipa::Modify for SecurityAddon {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            let components = openapi.components.get_or_insert_with(Default::default);
            components.add_security_scheme(
                "bearerAuth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .build(),
                ),
            );
        }
    }

    let mut doc = ApiDoc::openapi();
    doc.info.title.clone_from(&state.config.app_name);

    let (router, api) = OpenApiRouter::with_openapi(doc)
        .merge(crate::common::views::router(state))
        .merge(operators::views::router(state))
        .merge(stations::views::router(state))
        .merge(readings::views::router(state))
        .split_for_parts();

    router.merge(Scalar::with_url("/api/docs", api))
}
