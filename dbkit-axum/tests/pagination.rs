mod common;

use axum::http::Uri;
use common::{ids, setup, User};
use dbkit_axum::{col, DbError, PageError, PageParams, PageRequest, Paginator, Select, SlidingStyle};

fn users() -> Select {
    Select::from_table("users").order_by("users.id")
}

fn uri(s: &str) -> Uri {
    s.parse().unwrap()
}

#[tokio::test]
async fn paginates() {
    let (_pool, session) = setup().await;
    let page = Paginator::new(&session)
        .paginate::<User>(users(), 1, 2)
        .await
        .unwrap();

    assert_eq!(page.total(), 9);
    assert_eq!(page.total_pages(), 5);
    assert_eq!(ids(page.rows()), vec![1, 2]);
    assert!(page.has_next());
    assert!(!page.has_previous());
}

#[tokio::test]
async fn last_page_is_partial() {
    let (_pool, session) = setup().await;
    let page = Paginator::new(&session)
        .paginate::<User>(users(), 5, 2)
        .await
        .unwrap();

    assert_eq!(ids(page.rows()), vec![9]);
    assert_eq!(page.start_index(), 9);
    assert_eq!(page.end_index(), 9);
    assert!(!page.has_next());
}

#[tokio::test]
async fn page_past_the_end_is_empty() {
    let (_pool, session) = setup().await;
    let page = Paginator::new(&session)
        .paginate::<User>(users(), 8, 2)
        .await
        .unwrap();

    assert!(page.is_empty());
    assert_eq!(page.total(), 9);
    assert_eq!(page.page(), 8);
}

#[tokio::test]
async fn count_ignores_statement_limits() {
    let (_pool, session) = setup().await;
    let stmt = users().filter(col("id").gt(3)).limit(1).offset(1);
    let page = Paginator::new(&session)
        .paginate::<User>(stmt, 2, 2)
        .await
        .unwrap();

    assert_eq!(page.total(), 6);
    assert_eq!(ids(page.rows()), vec![6, 7]);
}

#[tokio::test]
async fn zero_page_size_is_rejected() {
    let (_pool, session) = setup().await;
    let err = Paginator::new(&session)
        .paginate::<User>(users(), 1, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Page(PageError::ZeroPageSize)));
}

#[tokio::test]
async fn paginates_from_request() {
    let (_pool, session) = setup().await;
    let paginator = Paginator::new(&session);
    let params = PageParams::default().default_page_size(2);

    let page = paginator
        .paginate_from_request::<User>(&uri("/users?page=1&page_size=2"), users(), &params)
        .await
        .unwrap();
    assert_eq!(page.total_pages(), 5);

    let page = paginator
        .paginate_from_request::<User>(&uri("/users?page=2"), users(), &params)
        .await
        .unwrap();
    assert_eq!(ids(page.rows()), vec![3, 4]);
}

#[tokio::test]
async fn custom_page_params() {
    let (_pool, session) = setup().await;
    let paginator = Paginator::new(&session);

    let params = PageParams::default().page_param("pg").default_page_size(2);
    let page = paginator
        .paginate_from_request::<User>(&uri("/users?pg=3&page_size=2"), users(), &params)
        .await
        .unwrap();
    assert_eq!(page.page(), 3);
    assert_eq!(page.total_pages(), 5);

    let params = PageParams::default().page_size_param("ps");
    let page = paginator
        .paginate_from_request::<User>(&uri("/users?page&ps=2"), users(), &params)
        .await
        .unwrap();
    assert_eq!(page.page(), 1);
    assert_eq!(page.total_pages(), 5);
}

#[tokio::test]
async fn max_page_size_caps_the_request() {
    let (_pool, session) = setup().await;
    let params = PageParams::default().default_page_size(2).max_page_size(2);
    let page = Paginator::new(&session)
        .paginate_from_request::<User>(&uri("/users?page&page_size=200"), users(), &params)
        .await
        .unwrap();
    assert_eq!(page.page_size(), 2);
    assert_eq!(page.total_pages(), 5);
}

#[tokio::test]
async fn paginate_request_and_page_links() {
    let (_pool, session) = setup().await;
    let page = Paginator::new(&session)
        .paginate_request::<User>(users(), PageRequest::new(3, 1))
        .await
        .unwrap();

    let links: Vec<u64> = page.iter_pages(&SlidingStyle::new(1, 1)).collect();
    assert_eq!(links, vec![2, 3, 4]);
    assert_eq!(page.to_string(), "Page 3 of 9, rows 3 - 3 of 9.");
}

#[tokio::test]
async fn huge_page_number_is_an_empty_page() {
    let (_pool, session) = setup().await;
    let page = Paginator::new(&session)
        .paginate_from_request::<User>(
            &uri("/users?page=999999999999999999"),
            users(),
            &PageParams::default(),
        )
        .await
        .unwrap();

    assert!(page.is_empty());
    assert_eq!(page.total(), 9);
    assert_eq!(page.page(), 999_999_999_999_999_999);
}

#[tokio::test]
async fn pages_cover_every_row_once() {
    let (_pool, session) = setup().await;
    let paginator = Paginator::new(&session);

    let mut seen = Vec::new();
    for page in 1..=5 {
        let page = paginator.paginate::<User>(users(), page, 2).await.unwrap();
        seen.extend(ids(page.rows()));
    }

    assert_eq!(seen, (1..=9).collect::<Vec<i64>>());
}
