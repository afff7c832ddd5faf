use axum::{Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::ApiResponse;

/// A curated shelf on the explore page. `filter_url` points back into the
/// search surface with the shelf's filters pre-applied.
#[derive(Debug, Clone, Serialize)]
pub(super) struct ExploreCategory {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub image_url: &'static str,
    pub filter_url: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct ExploreData {
    pub categories: &'static [ExploreCategory],
}

const EXPLORE_CATEGORIES: &[ExploreCategory] = &[
    ExploreCategory {
        id: "iconic-birkins",
        title: "Iconic Birkins",
        description: "The most coveted handbag in the world",
        image_url: "https://images.unsplash.com/photo-1584917865442-de89df76afd3?w=600&h=400&fit=crop",
        filter_url: "/explore?brands=Hermès&bag_type=top-handle",
    },
    ExploreCategory {
        id: "chanel-classics",
        title: "Chanel Classics",
        description: "Timeless elegance from the House of Chanel",
        image_url: "https://images.unsplash.com/photo-1548036328-c9fa89d128fa?w=600&h=400&fit=crop",
        filter_url: "/explore?brands=Chanel",
    },
    ExploreCategory {
        id: "everyday-totes",
        title: "Everyday Totes",
        description: "Spacious and stylish for daily use",
        image_url: "https://images.unsplash.com/photo-1566150905458-1bf1fc113f0d?w=600&h=400&fit=crop",
        filter_url: "/explore?bag_type=tote",
    },
    ExploreCategory {
        id: "crossbody-bags",
        title: "Crossbody Bags",
        description: "Hands-free luxury for the modern woman",
        image_url: "https://images.unsplash.com/photo-1594223274512-ad4803739b7c?w=600&h=400&fit=crop",
        filter_url: "/explore?bag_type=crossbody",
    },
    ExploreCategory {
        id: "investment-pieces",
        title: "Investment Pieces",
        description: "Bags that appreciate in value",
        image_url: "https://images.unsplash.com/photo-1591561954557-26941169b49e?w=600&h=400&fit=crop",
        filter_url: "/explore?min_price=10000",
    },
    ExploreCategory {
        id: "under-3000",
        title: "Under $3,000",
        description: "Luxury within reach",
        image_url: "https://images.unsplash.com/photo-1590874103328-eac38a683ce7?w=600&h=400&fit=crop",
        filter_url: "/explore?max_price=3000",
    },
    ExploreCategory {
        id: "pre-owned",
        title: "Pre-Owned Treasures",
        description: "Authenticated luxury at great value",
        image_url: "https://images.unsplash.com/photo-1614179689702-355944cd0918?w=600&h=400&fit=crop",
        filter_url: "/explore?country=US",
    },
    ExploreCategory {
        id: "new-arrivals",
        title: "New Arrivals",
        description: "Fresh from the runway",
        image_url: "https://images.unsplash.com/photo-1584917865442-de89df76afd3?w=600&h=400&fit=crop",
        filter_url: "/explore",
    },
];

pub(super) async fn list_categories(
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<ExploreData>> {
    let data = ExploreData {
        categories: EXPLORE_CATEGORIES,
    };
    Json(ApiResponse::new(data, req_id.0))
}
