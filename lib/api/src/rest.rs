use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use zipscope_core::{Dataset, Dimension, Feature, Lookup, SimilarityResult, ZipRecord};

#[derive(Deserialize)]
struct SimilarQuery {
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct ChartQuery {
    dimension: Option<String>,
    feature: Option<String>,
    min: Option<f64>,
    max: Option<f64>,
    cap: Option<usize>,
    dims: Option<usize>,
}

#[derive(Serialize)]
struct HoverInfo {
    population: f64,
    median_income: f64,
    bachelor_degree: f64,
    unemployment: f64,
    median_home_value: f64,
}

impl HoverInfo {
    fn from_record(record: &ZipRecord) -> Self {
        Self {
            population: record.population,
            median_income: record.median_income,
            bachelor_degree: record.bachelor_degree,
            unemployment: record.unemployment,
            median_home_value: record.median_home_value,
        }
    }
}

#[derive(Serialize)]
struct ChartPoint {
    zip: String,
    x: f64,
    y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    z: Option<f64>,
    hover: HoverInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    nearest_reference_zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    similarity_score: Option<f64>,
}

#[derive(Serialize)]
struct ChartResponse {
    xaxis_title: String,
    yaxis_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    zaxis_title: Option<String>,
    reference: Vec<ChartPoint>,
    candidates: Vec<ChartPoint>,
}

/// How one chart axis set is sourced: raw feature columns or the
/// precomputed projection.
enum AxisData {
    Features(Feature, Feature),
    Projection(usize),
}

pub struct RestApi;

impl RestApi {
    pub async fn start(dataset: Arc<Dataset>, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(dataset.clone()))
                .route("/api/dataset", web::get().to(dataset_info))
                .route("/api/similar", web::get().to(similar))
                .route("/api/chart", web::get().to(chart))
                .route("/api/slider/{feature}", web::get().to(slider))
                .route("/api/zip/{zip}", web::get().to(zip_detail))
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

fn bad_request(message: impl std::fmt::Display) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::BadRequest().json(serde_json::json!({
        "error": message.to_string()
    })))
}

async fn dataset_info(dataset: web::Data<Arc<Dataset>>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(dataset.info()))
}

async fn similar(
    dataset: web::Data<Arc<Dataset>>,
    query: web::Query<SimilarQuery>,
) -> ActixResult<HttpResponse> {
    let results = dataset.results();
    let limit = query.limit.unwrap_or(results.len()).min(results.len());
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "result": &results[..limit]
    })))
}

async fn chart(
    dataset: web::Data<Arc<Dataset>>,
    query: web::Query<ChartQuery>,
) -> ActixResult<HttpResponse> {
    let dimension = match query.dimension.as_deref() {
        Some(raw) => match Dimension::from_str(raw) {
            Ok(d) => d,
            Err(e) => return bad_request(e),
        },
        None => Dimension::Generalized,
    };
    let feature = match query.feature.as_deref() {
        Some(raw) => match Feature::from_str(raw) {
            Ok(f) => f,
            Err(e) => return bad_request(e),
        },
        None => Feature::Population,
    };
    let dims = query.dims.unwrap_or(2);
    if dims != 2 && dims != 3 {
        return bad_request(format!("invalid dims: {dims} (expected 2 or 3)"));
    }

    let (domain_min, domain_max) = dataset.feature_domain(feature);
    let min = query.min.unwrap_or(domain_min);
    let max = query.max.unwrap_or(domain_max);

    let (axis, xaxis_title, yaxis_title, zaxis_title) = match dimension.axes() {
        Some((fx, fy)) => (
            AxisData::Features(fx, fy),
            fx.label().to_string(),
            fy.label().to_string(),
            None,
        ),
        None => (
            AxisData::Projection(dims),
            "t-SNE Component 1".to_string(),
            "t-SNE Component 2".to_string(),
            (dims == 3).then(|| "t-SNE Component 3".to_string()),
        ),
    };

    let ds: &Dataset = &dataset;
    let view = ds.chart_view(feature, min, max, query.cap);

    let mut reference = Vec::with_capacity(view.reference.len());
    for record in &view.reference {
        match chart_point(ds, record, &axis, None) {
            Ok(point) => reference.push(point),
            Err(message) => return bad_request(message),
        }
    }

    let mut candidates = Vec::with_capacity(view.candidates.len());
    for (result, record) in &view.candidates {
        match chart_point(ds, record, &axis, Some(result)) {
            Ok(point) => candidates.push(point),
            Err(message) => return bad_request(message),
        }
    }

    Ok(HttpResponse::Ok().json(ChartResponse {
        xaxis_title,
        yaxis_title,
        zaxis_title,
        reference,
        candidates,
    }))
}

fn chart_point(
    dataset: &Dataset,
    record: &ZipRecord,
    axis: &AxisData,
    result: Option<&SimilarityResult>,
) -> Result<ChartPoint, String> {
    let (x, y, z) = match axis {
        AxisData::Features(fx, fy) => (record.feature(*fx), record.feature(*fy), None),
        AxisData::Projection(dims) => {
            let coords = dataset
                .coords(&record.zip, *dims)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| format!("no projection coordinates for ZIP {}", record.zip))?;
            (coords[0], coords[1], coords.get(2).copied())
        }
    };

    Ok(ChartPoint {
        zip: record.zip.clone(),
        x,
        y,
        z,
        hover: HoverInfo::from_record(record),
        nearest_reference_zip: result.map(|r| r.nearest_reference_zip.clone()),
        similarity_score: result.map(|r| r.similarity_score),
    })
}

async fn slider(
    dataset: web::Data<Arc<Dataset>>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let raw = path.into_inner();
    match Feature::from_str(&raw) {
        Ok(feature) => Ok(HttpResponse::Ok().json(dataset.slider_bounds(feature))),
        Err(e) => bad_request(e),
    }
}

async fn zip_detail(
    dataset: web::Data<Arc<Dataset>>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let zip = path.into_inner();
    match dataset.lookup(&zip) {
        Lookup::Found(profile) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "result": profile
        }))),
        Lookup::NotFound => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": "No data available for the selected ZIP code."
        }))),
    }
}
