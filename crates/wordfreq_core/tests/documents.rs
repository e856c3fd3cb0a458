use wordfreq_core::db::open_db_in_memory;
use wordfreq_core::{
    Document, DocumentRepository, DocumentTotals, PersistenceGateway, RepoError,
    SqliteDocumentRepository, StatsService,
};

const URL: &str = "https://en.wikipedia.org/wiki/Tarn";

#[test]
fn recorded_document_is_found_by_exact_url() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();

    assert!(!repo.has_document(URL).unwrap());
    repo.record_document(&Document::new(URL, 12)).unwrap();

    assert!(repo.has_document(URL).unwrap());
    assert!(!repo.has_document(&URL.to_uppercase()).unwrap());
    assert!(!repo.has_document(&format!("{URL}/")).unwrap());
    assert_eq!(
        repo.get_document(URL).unwrap(),
        Some(Document::new(URL, 12))
    );
}

#[test]
fn second_insert_of_same_url_is_rejected_by_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();

    repo.record_document(&Document::new(URL, 3)).unwrap();
    let err = repo.record_document(&Document::new(URL, 3)).unwrap_err();

    assert!(matches!(err, RepoError::Db(_)));
    assert_eq!(repo.document_totals().unwrap().documents, 1);
}

#[test]
fn zero_word_documents_are_recorded() {
    let conn = open_db_in_memory().unwrap();
    let service = StatsService::for_connection(&conn).unwrap();

    service.record_document(URL, 0).unwrap();

    assert!(service.has_document(URL).unwrap());
    assert_eq!(service.get_document(URL).unwrap(), Some(Document::new(URL, 0)));
}

#[test]
fn negative_totals_and_empty_urls_are_invalid() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.record_document(&Document::new(URL, -1)),
        Err(RepoError::InvalidData(_))
    ));
    assert!(matches!(
        repo.record_document(&Document::new("", 1)),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn totals_sum_document_word_counts() {
    let conn = open_db_in_memory().unwrap();
    let service = StatsService::for_connection(&conn).unwrap();
    assert_eq!(service.document_totals().unwrap(), DocumentTotals::default());

    service.record_document("https://example.org/a", 4).unwrap();
    service.record_document("https://example.org/b", 6).unwrap();

    assert_eq!(
        service.document_totals().unwrap(),
        DocumentTotals {
            documents: 2,
            words: 10
        }
    );
}
