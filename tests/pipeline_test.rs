//! Integration tests for the OCR block pipeline.

use docrecon::model::{CanvasSize, RegionRole, Token};
use docrecon::ocr::{map_tokens, reconstruct_page, OcrOptions, SuppressionState};

const SOURCE: CanvasSize = CanvasSize {
    width: 1700.0,
    height: 2200.0,
};

const WORDS: &[&str] = &[
    "공지", "안내", "회의", "일정", "변경", "Notice", "2024", "제출", "(필수)", "A-17", "서류",
];

/// Small deterministic generator so failures are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn range(&mut self, max: f32) -> f32 {
        (self.next() % 10_000) as f32 / 10_000.0 * max
    }
}

fn random_tokens(seed: u64, count: usize) -> Vec<Token> {
    let mut rng = Lcg(seed);
    (0..count)
        .map(|i| {
            let word = WORDS[rng.next() as usize % WORDS.len()];
            Token::new(
                format!("{}{}", word, i),
                rng.range(SOURCE.width),
                rng.range(SOURCE.height),
                1.0 + rng.range(800.0),
                1.0 + rng.range(150.0),
                rng.range(100.0),
            )
        })
        .collect()
}

fn line(text: &str, y: f32) -> Token {
    Token::new(text, 120.0, y, 900.0, 60.0, 92.0)
}

#[test]
fn test_regions_always_fit_destination() {
    let options = OcrOptions::default();
    for dest in [CanvasSize::slide(), CanvasSize::new(960.0, 540.0), CanvasSize::new(300.0, 900.0)] {
        for seed in 0..40 {
            let tokens = random_tokens(seed, 120);
            let regions = map_tokens(&tokens, SOURCE, dest, &options);

            assert!(regions.len() <= options.max_regions);
            assert!(regions.iter().filter(|r| r.role == RegionRole::Title).count() <= 1);
            for region in &regions {
                assert!(
                    region.fits_within(dest),
                    "seed {}: {:?} outside {:?}",
                    seed,
                    region.rect,
                    dest
                );
                assert!(region.confidence >= options.confidence_threshold);
            }
        }
    }
}

#[test]
fn test_pipeline_is_deterministic() {
    let options = OcrOptions::default();
    let tokens = random_tokens(7, 80);
    let first = map_tokens(&tokens, SOURCE, CanvasSize::slide(), &options);
    let second = map_tokens(&tokens, SOURCE, CanvasSize::slide(), &options);
    assert_eq!(first, second);
}

#[test]
fn test_same_line_tokens_merge() {
    let tokens = vec![
        Token::new("회의", 100.0, 500.0, 300.0, 40.0, 90.0),
        Token::new("안내", 420.0, 505.0, 300.0, 40.0, 85.0),
        Token::new("다음 줄", 100.0, 700.0, 400.0, 40.0, 90.0),
    ];
    let regions = map_tokens(&tokens, SOURCE, CanvasSize::slide(), &OcrOptions::default());
    let texts: Vec<&str> = regions.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["회의 안내", "다음 줄"]);
}

#[test]
fn test_regions_follow_reading_order() {
    let tokens = vec![
        line("세 번째 줄", 1500.0),
        line("첫 번째 줄", 300.0),
        line("두 번째 줄", 900.0),
    ];
    let regions = map_tokens(&tokens, SOURCE, CanvasSize::slide(), &OcrOptions::default());
    let ys: Vec<f32> = regions.iter().map(|r| r.rect.y).collect();
    assert_eq!(regions.len(), 3);
    assert!(ys.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(regions[0].text, "첫 번째 줄");
}

#[test]
fn test_repeated_text_dropped_across_pages() {
    let options = OcrOptions::default();
    let mut state = SuppressionState::new();
    let page = vec![line("기관명 머리글", 100.0), line("본문 첫 줄", 900.0)];

    let first = reconstruct_page(&page, SOURCE, CanvasSize::slide(), &options, &mut state);
    assert_eq!(first.len(), 2);

    let mut next = page.clone();
    next.push(line("두 번째 장 본문", 1300.0));
    let second = reconstruct_page(&next, SOURCE, CanvasSize::slide(), &options, &mut state);
    let texts: Vec<&str> = second.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["두 번째 장 본문"]);
}

#[test]
fn test_fresh_state_keeps_repeats() {
    let options = OcrOptions::default();
    let page = vec![line("기관명 머리글", 100.0)];
    assert_eq!(map_tokens(&page, SOURCE, CanvasSize::slide(), &options).len(), 1);
    assert_eq!(map_tokens(&page, SOURCE, CanvasSize::slide(), &options).len(), 1);
}

#[test]
fn test_low_confidence_page_is_empty() {
    let tokens: Vec<Token> = (0..10)
        .map(|i| Token::new(format!("흐림{}", i), 100.0, 100.0 + i as f32 * 150.0, 500.0, 50.0, 2.0))
        .collect();
    assert!(map_tokens(&tokens, SOURCE, CanvasSize::slide(), &OcrOptions::default()).is_empty());
}

#[test]
fn test_region_cap() {
    let tokens: Vec<Token> = (0..60)
        .map(|i| line(&format!("항목 {}", i), i as f32 * 35.0))
        .collect();
    let options = OcrOptions::default().with_limits(50, 30);
    let regions = map_tokens(&tokens, SOURCE, CanvasSize::slide(), &options);
    assert!(regions.len() <= 30);
    assert!(!regions.is_empty());
}

#[test]
fn test_title_from_top_zone() {
    let tokens = vec![
        Token::new("안내문", 200.0, 150.0, 1200.0, 150.0, 95.0),
        line("본문 내용입니다", 900.0),
    ];
    let regions = map_tokens(&tokens, SOURCE, CanvasSize::slide(), &OcrOptions::default());
    assert_eq!(regions[0].role, RegionRole::Title);
    assert_eq!(regions[0].font_size, 18);
    assert!(regions[0].bold);
    assert_eq!(regions[1].role, RegionRole::Body);
    assert!((12..=14).contains(&regions[1].font_size));
}
