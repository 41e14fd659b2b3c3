mod common;

use common::{MockClient, MockResponse, fixture, fixture_bytes};
use ntu_coursetake::app::results::{
    FAILED_COURSES_URL, INDEX_URL, LOGIN_URL, OPERATION_LOG_URL,
};
use ntu_coursetake::model::{OperationLogItem, ResultKind};
use ntu_coursetake::{ErrorKind, Result, ResultsClient};

#[tokio::test]
async fn login_must_land_on_index() {
    let mock = MockClient::new(vec![
        MockResponse::sso_page(),
        MockResponse::ok(INDEX_URL, "<html></html>"),
    ]);
    ResultsClient::new(&mock).login("u", "p").await.unwrap();
    assert_eq!(mock.sent()[0].url, LOGIN_URL);

    let mock = MockClient::new(vec![
        MockResponse::sso_page(),
        MockResponse::ok(format!("{INDEX_URL}?kind=1"), "<html></html>"),
    ]);
    let err = ResultsClient::new(&mock).login("u", "p").await.unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Contract(_)));
}

#[tokio::test]
async fn result_table_for_each_round() {
    for (kind, param) in [
        (ResultKind::PreregistrationStage1, "1"),
        (ResultKind::PreregistrationStage2, "2"),
    ] {
        let mock = MockClient::new(vec![MockResponse::ok(
            INDEX_URL,
            fixture("results_index.html"),
        )]);
        let items = ResultsClient::new(&mock)
            .get_result(kind)
            .await
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();

        let request = mock.last_sent();
        assert_eq!(request.url, INDEX_URL);
        assert_eq!(request.param("kind"), Some(param));

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].curriculum_identity_number, "902 10750");
        assert_eq!(items[0].course_name, "資料結構與演算法上");
        assert_eq!(items[0].instructor, "林教授");
        assert_eq!(items[0].mark, "加選");
        assert_eq!(items[1].mark, "");
    }
}

#[tokio::test]
async fn big5_result_page_is_decoded_from_its_bytes() {
    let mock = MockClient::new(vec![MockResponse::encoded(
        INDEX_URL,
        fixture_bytes("results_index_big5.html"),
    )]);
    let items = ResultsClient::new(&mock)
        .get_result(ResultKind::PreregistrationStage1)
        .await
        .unwrap()
        .collect::<Result<Vec<_>>>()
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].course_name, "資料結構與演算法上");
    assert_eq!(items[0].instructor, "林教授");
    assert_eq!(items[0].mark, "加選");
    assert_eq!(items[1].course_name, "線性代數");
}

#[tokio::test]
async fn operation_log_entries() {
    let mock = MockClient::new(vec![MockResponse::ok(
        OPERATION_LOG_URL,
        fixture("results_log.html"),
    )]);
    let items = ResultsClient::new(&mock)
        .get_operation_log(ResultKind::PreregistrationStage2)
        .await
        .unwrap()
        .collect::<Result<Vec<_>>>()
        .unwrap();

    assert_eq!(mock.last_sent().url, OPERATION_LOG_URL);
    assert_eq!(
        items,
        vec![
            OperationLogItem {
                time: "2024/08/20 09:00:01".into(),
                message: "登記 12345 志願 1".into(),
            },
            OperationLogItem {
                time: "2024/08/20 09:01:12".into(),
                message: "退選 24680".into(),
            },
        ]
    );
}

#[tokio::test]
async fn empty_operation_log_reports_heading() {
    let mock = MockClient::new(vec![MockResponse::ok(
        OPERATION_LOG_URL,
        fixture("results_log_empty.html"),
    )]);
    let err = ResultsClient::new(&mock)
        .get_operation_log(ResultKind::PreregistrationStage1)
        .await
        .err()
        .unwrap();

    match err.kind() {
        ErrorKind::TableNotFound { heading } => assert_eq!(heading, "查無操作紀錄"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn failed_courses_with_reason() {
    let mock = MockClient::new(vec![MockResponse::ok(
        FAILED_COURSES_URL,
        fixture("results_failed.html"),
    )]);
    let courses = ResultsClient::new(&mock)
        .get_failed_courses(ResultKind::PreregistrationStage1)
        .await
        .unwrap()
        .collect::<Result<Vec<_>>>()
        .unwrap();

    assert_eq!(mock.last_sent().url, FAILED_COURSES_URL);
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].serial_number, "24680");
    assert_eq!(courses[0].course_name, "羽球初級");
    assert_eq!(courses[0].instructor, "王老師");
    assert_eq!(courses[0].reason, "名額已滿");
}

#[tokio::test]
async fn failed_courses_page_with_result_headers_is_rejected() {
    let mock = MockClient::new(vec![MockResponse::ok(
        FAILED_COURSES_URL,
        fixture("results_failed.html").replace("未分發上原因", "備註"),
    )]);
    let err = ResultsClient::new(&mock)
        .get_failed_courses(ResultKind::PreregistrationStage1)
        .await
        .err()
        .unwrap();
    assert!(err.is_structural());
}
