//! The crate root can be glob-imported next to thiserror derives.

use daily_log_sink::*;

#[derive(Debug, thiserror::Error)]
#[error("upload failed")]
struct UploadFailed(#[source] Located);

#[derive(Debug, thiserror::Error)]
enum StoreError {
    #[error("store unavailable")]
    Unavailable(#[from] std::io::Error),
}

fn upload() -> std::result::Result<(), UploadFailed> {
    Err(UploadFailed(located!("bucket missing")))
}

#[test]
fn derives_with_sources_compile_under_glob_import() {
    let err = upload().unwrap_err();
    let origin = callsite::origin_of(err.as_error_object()).expect("origin");
    assert_eq!(origin.method, "upload");

    let store = StoreError::from(std::io::Error::new(std::io::ErrorKind::Other, "down"));
    assert_eq!(callsite::render_error(&store), "store unavailable: down");
}
