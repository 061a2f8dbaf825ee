use super::*;

#[test]
fn pdf_content_type_accepted() {
    assert!(check_content_type("application/pdf").is_ok());
    assert!(check_content_type("Application/PDF; charset=binary").is_ok());
}

#[test]
fn other_content_types_rejected() {
    let err = check_content_type("image/png").unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedType(ref t) if t == "image/png"));
    assert_eq!(err.error_code(), "E_UNSUPPORTED_TYPE");
    assert!(check_content_type("").is_err());
}

#[test]
fn page_size_is_one_indexed() {
    let info = DocumentInfo { page_sizes: vec![Size::new(600.0, 800.0), Size::new(800.0, 600.0)] };
    assert_eq!(info.page_count(), 2);
    assert_eq!(info.page_size(1), Some(Size::new(600.0, 800.0)));
    assert_eq!(info.page_size(2), Some(Size::new(800.0, 600.0)));
    assert_eq!(info.page_size(0), None);
    assert_eq!(info.page_size(3), None);
}

#[test]
fn render_backend_errors_are_retryable() {
    assert!(RenderError::Backend("gpu lost".into()).retryable());
    assert!(!RenderError::PageOutOfRange { page: 4, total: 3 }.retryable());
    assert!(!LoadError::NoPages.retryable());
}
