use super::*;

fn meta(width: u32, height: u32) -> MovieMetadata {
    MovieMetadata {
        width,
        height,
        bits_per_pixel: 24,
        frame_count: 1,
    }
}

fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RawFrame {
    RawFrame::new(
        std::iter::repeat_n(rgb, (width * height) as usize)
            .flatten()
            .collect(),
    )
}

#[test]
fn grid_halves_lines_for_tall_character_cells() {
    let r = AsciiRenderer::new(&meta(160, 90), 80, TextFormat::Text).unwrap();
    assert_eq!(r.grid(), (80, 22));

    // Very wide movies still get one line.
    let r = AsciiRenderer::new(&meta(1000, 2), 10, TextFormat::Text).unwrap();
    assert_eq!(r.grid(), (10, 1));
}

#[test]
fn configure_rejects_unusable_metadata() {
    assert!(AsciiRenderer::new(&meta(0, 10), 80, TextFormat::Text).is_err());
    assert!(AsciiRenderer::new(&meta(10, 10), 0, TextFormat::Text).is_err());
    let rgba = MovieMetadata {
        bits_per_pixel: 32,
        ..meta(10, 10)
    };
    assert!(matches!(
        AsciiRendererFactory::default().configure(&rgba, 8),
        Err(ReelError::Render(_))
    ));
}

#[test]
fn text_export_maps_black_and_white_to_ramp_ends() {
    let mut r = AsciiRenderer::new(&meta(8, 8), 4, TextFormat::Text).unwrap();
    let (cols, lines) = r.grid();

    let black = r.render(&solid(8, 8, [0, 0, 0])).unwrap();
    let expected_black = format!("{}\n", " ".repeat(cols as usize)).repeat(lines as usize);
    assert_eq!(black.as_bytes(), expected_black.as_bytes());

    let white = r.render(&solid(8, 8, [255, 255, 255])).unwrap();
    let expected_white = format!("{}\n", "@".repeat(cols as usize)).repeat(lines as usize);
    assert_eq!(white.as_bytes(), expected_white.as_bytes());
}

#[test]
fn html_export_is_a_pre_fragment() {
    let mut r = AsciiRenderer::new(&meta(4, 4), 2, TextFormat::Html).unwrap();
    let frame = r.render(&solid(4, 4, [255, 255, 255])).unwrap();
    let text = std::str::from_utf8(frame.as_bytes()).unwrap();
    assert!(text.starts_with("<pre class=\"asciireel-frame\">"));
    assert!(text.ends_with("</pre>"));
    assert!(text.contains("@@"));
}

#[test]
fn ansi_export_colours_each_row_and_resets() {
    let mut r = AsciiRenderer::new(&meta(4, 4), 2, TextFormat::Ansi).unwrap();
    let frame = r.render(&solid(4, 4, [255, 0, 0])).unwrap();
    let text = std::str::from_utf8(frame.as_bytes()).unwrap();
    assert!(text.starts_with("\x1b[38;2;"));
    assert_eq!(text.matches("\x1b[0m\n").count(), r.grid().1 as usize);
    assert!(text.ends_with("\x1b[0m\n"));
}

#[test]
fn render_rejects_wrong_buffer_size() {
    let mut r = AsciiRenderer::new(&meta(4, 4), 2, TextFormat::Text).unwrap();
    let err = r.render(&RawFrame::new(vec![0u8; 10])).unwrap_err();
    assert!(matches!(err, ReelError::Render(_)));
}

#[test]
fn text_format_parses_case_insensitively() {
    assert_eq!("HTML".parse::<TextFormat>().unwrap(), TextFormat::Html);
    assert_eq!("ansi".parse::<TextFormat>().unwrap(), TextFormat::Ansi);
    assert!("gif".parse::<TextFormat>().is_err());
}
