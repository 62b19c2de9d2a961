//! Content source navigation and range expansion tests.

mod common;

use std::sync::Arc;

use common::{page, synthetic, FixedSource, SERIES};
use mangaview_rs::{ChapterRef, ContentSource, ErrorKind, PageRange, PageRef};

fn source() -> ContentSource {
    ContentSource::new(synthetic())
}

#[tokio::test]
async fn test_next_page_within_chapter() {
    let source = source();
    let next = source.get_next_page_ref(&page(0, 4)).await.unwrap();
    assert_eq!(next, Some(page(0, 5)));
}

#[tokio::test]
async fn test_next_and_previous_cross_chapter_boundary() {
    let source = source();

    let next = source.get_next_page_ref(&page(0, 29)).await.unwrap();
    assert_eq!(next, Some(page(1, 0)));

    let previous = source.get_previous_page_ref(&page(1, 0)).await.unwrap();
    assert_eq!(previous, Some(page(0, 29)));
}

#[tokio::test]
async fn test_next_and_previous_are_inverse() {
    let source = source();
    for (chapter, number) in [(0, 0), (0, 29), (3, 14), (8, 29)] {
        let start = page(chapter, number);
        let next = source.get_next_page_ref(&start).await.unwrap().unwrap();
        let back = source.get_previous_page_ref(&next).await.unwrap();
        assert_eq!(back, Some(start));
    }
}

#[tokio::test]
async fn test_sequence_ends() {
    let source = source();

    assert_eq!(source.get_previous_page_ref(&page(0, 0)).await.unwrap(), None);
    assert_eq!(source.get_next_page_ref(&page(9, 29)).await.unwrap(), None);
}

#[tokio::test]
async fn test_get_more_pages_forward_across_boundary() {
    let source = source();

    let refs = source.get_more_pages(&page(0, 29), 1).await.unwrap();
    assert_eq!(refs, vec![page(1, 0)]);

    let refs = source.get_more_pages(&page(0, 27), 4).await.unwrap();
    assert_eq!(refs, vec![page(0, 28), page(0, 29), page(1, 0), page(1, 1)]);
}

#[tokio::test]
async fn test_get_more_pages_backward_is_ascending() {
    let source = source();

    let refs = source.get_more_pages(&page(1, 1), -3).await.unwrap();
    assert_eq!(refs, vec![page(0, 28), page(0, 29), page(1, 0)]);
}

#[tokio::test]
async fn test_get_more_pages_stops_short() {
    let source = source();

    assert!(source.get_more_pages(&page(0, 0), -1).await.unwrap().is_empty());
    assert!(source.get_more_pages(&page(0, 5), 0).await.unwrap().is_empty());

    let refs = source.get_more_pages(&page(9, 27), 10).await.unwrap();
    assert_eq!(refs, vec![page(9, 28), page(9, 29)]);

    let refs = source.get_more_pages(&page(0, 2), -10).await.unwrap();
    assert_eq!(refs, vec![page(0, 0), page(0, 1)]);
}

#[tokio::test]
async fn test_expand_empty_and_single_page_ranges() {
    let source = source();
    let a = page(2, 7);

    let refs = source
        .expand_page_range(&PageRange::between(a.clone(), a.clone()))
        .await
        .unwrap();
    assert!(refs.is_empty());

    let next = source.get_next_page_ref(&a).await.unwrap().unwrap();
    let refs = source
        .expand_page_range(&PageRange::between(a.clone(), next))
        .await
        .unwrap();
    assert_eq!(refs, vec![a]);
}

#[tokio::test]
async fn test_expand_closed_range_across_chapters() {
    let source = source();

    let refs = source
        .expand_page_range(&PageRange::between(page(0, 28), page(1, 2)))
        .await
        .unwrap();
    assert_eq!(
        refs,
        vec![page(0, 28), page(0, 29), page(1, 0), page(1, 1)]
    );
}

#[tokio::test]
async fn test_expand_open_end_uses_default_span() {
    let source = source();

    let refs = source
        .expand_page_range(&PageRange::from(page(0, 25)))
        .await
        .unwrap();
    assert_eq!(refs.len(), 10);
    assert_eq!(refs.first(), Some(&page(0, 25)));
    assert_eq!(refs.last(), Some(&page(1, 4)));

    // Runs out of content before the span is filled.
    let refs = source
        .expand_page_range(&PageRange::from(page(9, 25)))
        .await
        .unwrap();
    assert_eq!(refs.len(), 5);
    assert_eq!(refs.last(), Some(&page(9, 29)));
}

#[tokio::test]
async fn test_expand_open_start_ends_before_end() {
    let source = source();

    let refs = source
        .expand_page_range(&PageRange::until(page(1, 2)))
        .await
        .unwrap();
    assert_eq!(refs.len(), 10);
    assert_eq!(refs.first(), Some(&page(0, 22)));
    assert_eq!(refs.last(), Some(&page(1, 1)));

    let refs = source
        .expand_page_range(&PageRange::until(page(0, 0)))
        .await
        .unwrap();
    assert!(refs.is_empty());
}

#[tokio::test]
async fn test_expand_rejects_ranges_past_the_limit() {
    let source = source();

    // Seven chapters of 30 pages is 210 pages.
    let err = source
        .expand_page_range(&PageRange::between(page(0, 0), page(7, 0)))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RangeLimitExceeded);

    // Exactly the limit is allowed.
    let refs = source
        .expand_page_range(&PageRange::between(page(0, 0), page(3, 10)))
        .await
        .unwrap();
    assert_eq!(refs.len(), 100);
}

#[tokio::test]
async fn test_expand_honours_custom_limit() {
    let source = ContentSource::new(synthetic()).with_range_limit(5);

    let err = source
        .expand_page_range(&PageRange::between(page(0, 0), page(0, 6)))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RangeLimitExceeded);
}

#[tokio::test]
async fn test_expand_rejects_malformed_ranges() {
    let source = source();

    let err = source
        .expand_page_range(&PageRange::between(page(1, 5), page(0, 5)))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRange);

    let err = source
        .expand_page_range(&PageRange::between(
            page(0, 0),
            PageRef::new("other-series", 0, 5),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRange);

    let err = source
        .expand_page_range(&PageRange::new(None, None))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRange);
}

#[tokio::test]
async fn test_expand_rejects_unreachable_end() {
    // The walk runs out of content before meeting the end.
    let single = ContentSource::new(Arc::new(FixedSource {
        page_counts: vec![30],
    }));
    let err = single
        .expand_page_range(&PageRange::between(page(0, 20), page(0, 35)))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRange);

    // The walk steps over an end that names no page.
    let err = source()
        .expand_page_range(&PageRange::between(page(0, 20), page(0, 35)))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRange);
}

#[tokio::test]
async fn test_first_page_at_or_after() {
    let source = ContentSource::new(Arc::new(FixedSource {
        page_counts: vec![0, 0, 4],
    }));

    let first = source.first_page_at_or_after(&page(0, 0)).await.unwrap();
    assert_eq!(first, Some(page(2, 0)));

    let same = source.first_page_at_or_after(&page(2, 3)).await.unwrap();
    assert_eq!(same, Some(page(2, 3)));

    assert_eq!(source.first_page_at_or_after(&page(3, 0)).await.unwrap(), None);

    let err = source.first_page_at_or_after(&page(2, 9)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidReference);
}

#[tokio::test]
async fn test_chapters_are_cached() {
    let provider = synthetic();
    let source = ContentSource::new(provider.clone());
    let chapter = ChapterRef::new(SERIES, 0);

    let first = source.get_chapter(&chapter).await.unwrap().unwrap();
    let second = source.get_chapter(&chapter).await.unwrap().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.len(), 30);
    assert_eq!(provider.chapter_requests(), 1);

    // Walking inside the chapter never resolves it again.
    source.get_more_pages(&page(0, 0), 20).await.unwrap();
    assert_eq!(provider.chapter_requests(), 1);
    assert_eq!(source.cached_chapters(), 1);
}

#[tokio::test]
async fn test_absent_chapter_is_not_cached() {
    let provider = synthetic();
    let source = ContentSource::new(provider.clone());
    let missing = ChapterRef::new(SERIES, 10);

    assert!(source.get_chapter(&missing).await.unwrap().is_none());
    assert!(source.get_chapter(&missing).await.unwrap().is_none());
    assert_eq!(provider.chapter_requests(), 2);
    assert_eq!(source.cached_chapters(), 0);
}

#[tokio::test]
async fn test_empty_chapters_are_skipped() {
    let source = ContentSource::new(Arc::new(FixedSource {
        page_counts: vec![3, 0, 0, 2],
    }));

    let next = source.get_next_page_ref(&page(0, 2)).await.unwrap();
    assert_eq!(next, Some(page(3, 0)));

    let previous = source.get_previous_page_ref(&page(3, 0)).await.unwrap();
    assert_eq!(previous, Some(page(0, 2)));

    let refs = source
        .expand_page_range(&PageRange::from(page(0, 0)))
        .await
        .unwrap();
    assert_eq!(refs, vec![page(0, 0), page(0, 1), page(0, 2), page(3, 0), page(3, 1)]);
}

#[tokio::test]
async fn test_references_into_missing_content_are_rejected() {
    let source = source();

    let err = source.get_next_page_ref(&page(42, 0)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidReference);

    let err = source.get_pages(&[page(0, 1), page(0, 99)]).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidReference);
}

#[tokio::test]
async fn test_get_pages_preserves_order_and_loads_images() {
    let source = source();

    let pages = source
        .get_pages(&[page(1, 3), page(0, 0), page(1, 3)])
        .await
        .unwrap();
    let refs: Vec<_> = pages.iter().map(|p| p.page_ref.clone()).collect();
    assert_eq!(refs, vec![page(1, 3), page(0, 0), page(1, 3)]);

    let image = pages[0].load_image().await.unwrap();
    assert_eq!(image.mime, "image/svg+xml");
    let svg = String::from_utf8(image.bytes.to_vec()).unwrap();
    assert!(svg.contains("Chapter 1, page 3"));
}

#[tokio::test]
async fn test_get_page_range_wraps_pages() {
    let source = source();

    let pages = source
        .get_page_range(&PageRange::from(PageRef::series_start(SERIES)))
        .await
        .unwrap();
    assert_eq!(pages.len(), 10);
    assert_eq!(pages[0].page_ref, page(0, 0));
    assert_eq!(pages[9].page_ref, page(0, 9));
}
