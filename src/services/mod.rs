pub mod event_service;
pub mod link_service;
pub mod product_service;
pub mod review_service;

pub use event_service::EventService;
pub use link_service::{
    AdminLinkItem, AdminLinkPage, AdminLinkQuery, CreateTrackerRequest, LinkService,
    RecordHitRequest,
};
pub use product_service::{
    parse_product_list_params, FacetSummary, PageInfo, ProductDetail, ProductListItem,
    ProductListParams, ProductListResponse, ProductQueryService, SortOption, VariantSummary,
};
pub use review_service::{FieldErrors, ReviewService, ReviewSubmission, ReviewSubmitOutcome};
