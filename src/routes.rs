use crate::{
    api::{rate_table, report, work_record, worker},
    config::Config,
};
use actix_governor::{
    governor::middleware::NoOpMiddleware, Governor, GovernorConfigBuilder, PeerIpKeyExtractor,
};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/workers")
                    .wrap(build_limiter(config.rate_default_per_min))
                    // /workers
                    .service(
                        web::resource("")
                            .route(web::post().to(worker::create_worker))
                            .route(web::get().to(worker::list_workers)),
                    )
                    // /workers/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(worker::update_worker))
                            .route(web::get().to(worker::get_worker)),
                    )
                    .service(
                        web::resource("/{id}/block").route(web::put().to(worker::block_worker)),
                    )
                    .service(
                        web::resource("/{id}/unblock")
                            .route(web::put().to(worker::unblock_worker)),
                    ),
            )
            .service(
                web::scope("/work-records")
                    .wrap(build_limiter(config.rate_mutation_per_min))
                    .service(
                        web::resource("")
                            .route(web::post().to(work_record::save_work_record))
                            .route(web::get().to(work_record::list_work_records)),
                    )
                    .service(
                        web::resource("/batch")
                            .route(web::post().to(work_record::save_work_record_batch)),
                    ),
            )
            .service(
                web::scope("/rates")
                    .wrap(build_limiter(config.rate_mutation_per_min))
                    .service(web::resource("").route(web::get().to(rate_table::list_rate_years)))
                    .service(
                        web::resource("/{year}")
                            .route(web::put().to(rate_table::upsert_rates))
                            .route(web::get().to(rate_table::get_rates)),
                    ),
            )
            .service(
                web::scope("/reports").wrap(build_limiter(config.rate_export_per_min)).service(
                    web::resource("/{kind}").route(web::get().to(report::download_report)),
                ),
            ),
    );
}

// REPORT DOWNLOAD
//  ├─ GET /api/v1/reports/internal?project_id=&year=&month=
//  ├─ GET /api/v1/reports/kwdi?...
//  └─ GET /api/v1/reports/nts?...
//       └─ xlsx attachment, named {kind}_{project}_{YYYY}-{MM}.xlsx
