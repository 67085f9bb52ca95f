//! Client tests against a one-shot HTTP responder on the loopback interface.

use data_access::{
    AccessConfig, AccessError, Accept, DataClient, DataRequest, NcssQuery, ResponseFormat,
};
use test_utils::fixtures::{bbox, responses, time};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wx_common::{BoundingBox, TimeSelector, Unit};

/// Serve one canned response and hand back the request line it received.
async fn serve_once(
    status: &'static str,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 8192];
        let n = socket.read(&mut buf).await.unwrap();
        let request = String::from_utf8_lossy(&buf[..n]).to_string();

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/geo+json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        request.lines().next().unwrap_or_default().to_string()
    });

    (base, handle)
}

fn client_for(base: &str) -> DataClient {
    DataClient::new(AccessConfig {
        ncss_base_url: format!("{}/thredds/ncss/grid/gfs/Best", base),
        edr_base_url: format!("{}/edr", base),
        timeout_secs: 5,
        ..Default::default()
    })
    .unwrap()
}

fn lightning_request() -> DataRequest {
    let (min_lon, min_lat, max_lon, max_lat) = bbox::GOES_EAST;
    DataRequest::builder()
        .data_type("binlightning")
        .source("GLM")
        .parameter("flash_energy")
        .time(TimeSelector::parse(&format!("{}/{}", time::WINDOW_START, time::WINDOW_END)).unwrap())
        .bbox(BoundingBox::new(min_lon, min_lat, max_lon, max_lat))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_fetch_points_geojson() {
    let (base, server) = serve_once("200 OK", responses::GLM_GEOJSON).await;
    let client = client_for(&base);

    let batches = client.fetch_points(&lightning_request()).await.unwrap();
    let request_line = server.await.unwrap();

    assert!(request_line.starts_with("GET /edr/collections/GLM/cube?parameter-name=flash_energy"));
    assert!(request_line.contains("f=GeoJSON"));

    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!(batch.units, Unit::Femtojoules);
    // Third feature has no flash_energy
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.value_range(), Some((3.0, 12.5)));
    assert!(batch.points.iter().all(|p| p.time.is_some()));
}

#[tokio::test]
async fn test_http_status_is_surfaced() {
    let (base, server) = serve_once("404 Not Found", "").await;
    let client = client_for(&base);

    let err = client.fetch_points(&lightning_request()).await.unwrap_err();
    server.await.unwrap();
    match err {
        AccessError::Http { status, url } => {
            assert_eq!(status, 404);
            assert!(url.contains("/edr/collections/GLM/cube"));
        }
        other => panic!("expected HTTP error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_grid_requires_netcdf() {
    let client = DataClient::new(AccessConfig::default()).unwrap();
    let query = NcssQuery::new()
        .variable("Temperature_isobaric")
        .accept(Accept::Csv);
    let err = client.fetch_grid(&query).await.unwrap_err();
    assert!(matches!(err, AccessError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_netcdf_body_that_is_not_netcdf() {
    let (base, server) = serve_once("200 OK", "definitely not hdf5").await;
    let client = client_for(&base);

    let query = NcssQuery::new().variable("Temperature_isobaric");
    let err = client.fetch_grid(&query).await.unwrap_err();
    let request_line = server.await.unwrap();

    assert!(request_line.contains("var=Temperature_isobaric"));
    assert!(request_line.contains("accept=netcdf4"));
    assert!(matches!(err, AccessError::NetCdf(_)));
}

#[test]
fn test_builder_fails_fast() {
    let no_params = DataRequest::builder()
        .data_type("binlightning")
        .source("GLM")
        .build();
    assert!(matches!(no_params, Err(AccessError::InvalidRequest(_))));

    let bad_type = DataRequest::builder()
        .data_type("satellite")
        .source("GLM")
        .parameter("flash_energy")
        .build();
    assert!(matches!(bad_type, Err(AccessError::InvalidRequest(_))));

    let start = wx_common::time::parse_iso8601(time::WINDOW_END).unwrap();
    let end = wx_common::time::parse_iso8601(time::WINDOW_START).unwrap();
    let inverted = DataRequest::builder()
        .data_type("binlightning")
        .source("GLM")
        .parameter("flash_energy")
        .time(TimeSelector::Range { start, end })
        .build();
    assert!(matches!(inverted, Err(AccessError::InvalidRequest(_))));
}

#[test]
fn test_cube_url_for_netcdf_window() {
    let mut request = lightning_request();
    request.format = ResponseFormat::NetCdf;
    let url = request.cube_url("http://localhost:8083/edr").unwrap();
    let query = url.query().unwrap();
    assert!(query.contains("datetime=2024-01-15T12%3A00%3A00Z%2F2024-01-15T12%3A10%3A00Z"));
    assert!(query.contains("bbox=-140%2C-50%2C-10%2C55"));
    assert!(query.ends_with("f=NetCDF"));
}
