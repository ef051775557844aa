//! # Spreadsheet Sampler Integration Tests

use anyhow::Result;
use menuforge::sample::{DocumentSampler, SampleError};
use menuforge::types::{DocumentRef, MediaType};
use menuforge_sheets::SpreadsheetSampler;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn a_share_link_is_rewritten_and_downloaded() -> Result<()> {
    let server = MockServer::start().await;
    let csv_content = "Item,Price\nClassic Burger,$8.00\nGarden Salad,$6.50";
    Mock::given(method("GET"))
        .and(path("/spreadsheets/d/mock_sheet_id_12345/export"))
        .and(query_param("format", "csv"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/csv")
                .set_body_string(csv_content),
        )
        .expect(1)
        .mount(&server)
        .await;

    let share_url = format!("{}/spreadsheets/d/mock_sheet_id_12345/edit", server.uri());
    let doc = DocumentRef::remote("doc-1", "menu-sheet", MediaType::Spreadsheet, share_url);

    let sample = SpreadsheetSampler::default().sample(&doc).await?;

    let text = sample.text.expect("expected a text sample");
    assert!(text.contains("Item: Classic Burger, Price: $8.00"));
    assert!(text.contains("Item: Garden Salad, Price: $6.50"));
    assert!(sample.image.is_none());
    Ok(())
}

#[tokio::test]
async fn inline_csv_bytes_are_sampled_directly() -> Result<()> {
    let doc = DocumentRef::inline(
        "doc-1",
        "menu.csv",
        MediaType::Spreadsheet,
        b"Item,Price\nLemonade,$3.00".to_vec(),
    );

    let sample = SpreadsheetSampler::default().sample(&doc).await?;
    assert_eq!(
        sample.text.as_deref(),
        Some("Item: Lemonade, Price: $3.00\n")
    );
    Ok(())
}

#[tokio::test]
async fn a_failed_download_surfaces_as_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let share_url = format!("{}/spreadsheets/d/missing_sheet/edit", server.uri());
    let doc = DocumentRef::remote("doc-1", "menu-sheet", MediaType::Spreadsheet, share_url);

    let err = SpreadsheetSampler::default().sample(&doc).await.unwrap_err();
    assert!(matches!(err, SampleError::Fetch(_)));
}

#[tokio::test]
async fn binary_excel_workbooks_are_rejected_cleanly() {
    // Zip magic as written at the front of every .xlsx file.
    let xlsx = DocumentRef::inline(
        "doc-1",
        "menu.xlsx",
        MediaType::Spreadsheet,
        b"PK\x03\x04rest-of-archive".to_vec(),
    );
    let err = SpreadsheetSampler::default().sample(&xlsx).await.unwrap_err();
    assert!(matches!(err, SampleError::Parse(_)));
    assert!(err.to_string().contains("binary Excel workbook"));

    // OLE2 magic as written at the front of every legacy .xls file.
    let mut legacy_bytes = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
    legacy_bytes.extend_from_slice(&[0u8; 16]);
    let xls = DocumentRef::inline("doc-2", "menu.xls", MediaType::Spreadsheet, legacy_bytes);
    let err = SpreadsheetSampler::default().sample(&xls).await.unwrap_err();
    assert!(matches!(err, SampleError::Parse(_)));
}

#[tokio::test]
async fn a_header_only_sheet_is_rejected() {
    let doc = DocumentRef::inline(
        "doc-1",
        "empty.csv",
        MediaType::Spreadsheet,
        b"Item,Price\n".to_vec(),
    );

    let err = SpreadsheetSampler::default().sample(&doc).await.unwrap_err();
    assert!(matches!(err, SampleError::Parse(_)));
}
