use asciify_core::{
    convert, dither, AsciiError, AsciiRenderer, BlockMode, Conversion, ConvertOptions,
    DitherAlgorithm, GlyphRamp, LayoutPolicy, RasterImage, StrategyKind, ToneField,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn solid_rgb(width: u32, height: u32, value: u8) -> RasterImage {
    let samples = vec![value; (width * height * 3) as usize];
    RasterImage::from_raw(width, height, 3, samples).unwrap()
}

fn random_rgb(rng: &mut StdRng) -> RasterImage {
    let width = rng.gen_range(1..=48);
    let height = rng.gen_range(1..=48);
    let samples = (0..width * height * 3).map(|_| rng.gen()).collect();
    RasterImage::from_raw(width, height, 3, samples).unwrap()
}

fn options(pairs: &[(&str, &str)]) -> ConvertOptions {
    ConvertOptions::from_pairs(pairs.iter().copied()).unwrap()
}

#[test]
fn white_image_maps_to_sparsest_glyph() {
    let image = solid_rgb(2, 2, 255);
    let grid = convert(&image, "brightness", &options(&[("width", "2")])).unwrap();

    // 2 * (2 / 2) * 0.55 rounds to a single row.
    assert_eq!((grid.width, grid.height), (2, 1));
    assert_eq!(grid.to_string(), "  ");
}

#[test]
fn inverted_white_image_maps_to_densest_glyph() {
    let image = solid_rgb(2, 2, 255);
    let grid =
        convert(&image, "brightness", &options(&[("width", "2"), ("invert", "true")])).unwrap();
    assert_eq!(grid.to_string(), "@@");
}

#[test]
fn transparent_pixels_render_as_white() {
    let image = RasterImage::from_raw(2, 2, 4, vec![0, 0, 0, 0].repeat(4)).unwrap();
    let grid = convert(&image, "brightness", &options(&[("width", "2")])).unwrap();
    assert_eq!(grid.to_string(), "  ");
}

#[test]
fn vertical_edge_classifies_as_vertical() {
    let width = 48u32;
    let samples = (0..width * width)
        .map(|i| if i % width < width / 2 { 0 } else { 255 })
        .collect();
    let image = RasterImage::from_raw(width, width, 1, samples).unwrap();
    let grid = convert(
        &image,
        "sobel_gradient",
        &options(&[("width", "48"), ("show_magnitude", "false")]),
    )
    .unwrap();

    for row in grid.rows() {
        let boundary: Vec<char> = row.chars().skip(22).take(4).collect();
        assert!(boundary.iter().any(|&c| c == '|' || c == '#'), "row {row:?}");
        assert!(!row.contains('-') && !row.contains('='), "row {row:?}");
    }
}

#[test]
fn mid_gray_two_level_dither_disperses() {
    let field = ToneField::filled(4, 4, 128.0);
    let out = dither(&field, DitherAlgorithm::FloydSteinberg, 2);

    let mut distinct: Vec<f64> = out.samples().to_vec();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup();
    assert_eq!(distinct, vec![64.0, 192.0]);

    let high = out.samples().iter().filter(|&&v| v == 192.0).count();
    assert!(high > 0 && high < 16);
}

#[test]
fn output_dimensions_follow_the_layout() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let block_modes = ["block", "halfblock", "braille", "braille-dither"];

    for _ in 0..12 {
        let image = random_rgb(&mut rng);
        let width: u32 = rng.gen_range(1..=64);
        let (sw, sh) = image.dimensions();

        for kind in StrategyKind::ALL {
            let modes: &[&str] = if kind == StrategyKind::BlockChars { &block_modes } else { &[""] };
            for mode in modes {
                let mut opts = options(&[("width", &width.to_string())]);
                if !mode.is_empty() {
                    opts.mode = Some(mode.to_string());
                }
                let conversion = Conversion::from_options(kind, &opts).unwrap();
                let grid = conversion.run(&image).unwrap();
                let geometry = conversion.layout().derive(sw, sh, width).unwrap();

                let expected_rows = match conversion.layout() {
                    LayoutPolicy::Cells { .. } => geometry.rows,
                    LayoutPolicy::HalfBlocks { .. } => geometry.rows / 2,
                    LayoutPolicy::BrailleCells { .. } => geometry.rows / 4,
                };
                assert_eq!(grid.width, width as usize, "{kind} {mode}");
                assert_eq!(grid.height, expected_rows as usize, "{kind} {mode}");
                assert!(grid.rows().all(|row| row.chars().count() == grid.width));
            }
        }
    }
}

#[test]
fn braille_extremes() {
    let mut opts = options(&[("width", "4")]);
    opts.mode = Some(BlockMode::Braille.name().to_owned());

    let black = convert(&solid_rgb(8, 16, 0), "block_chars", &opts).unwrap();
    assert!(black.cells.iter().all(|&c| c == '\u{28FF}'));

    let white = convert(&solid_rgb(8, 16, 255), "block_chars", &opts).unwrap();
    assert!(white.cells.iter().all(|&c| c == '\u{2800}'));
}

#[test]
fn invalid_options_fail_before_rendering() {
    let image = solid_rgb(4, 4, 10);
    let cases: &[(&str, &[(&str, &str)])] = &[
        ("brightness", &[("width", "0")]),
        ("brightness", &[("width", "1001")]),
        ("brightness", &[("contrast", "-0.5")]),
        ("edge_detection", &[("blur_kernel", "33")]),
        ("dithering", &[("levels", "1")]),
        ("dithering", &[("algorithm", "sierra")]),
        ("block_chars", &[("threshold", "300")]),
        ("block_chars", &[("mode", "sixel")]),
    ];

    for (strategy, pairs) in cases {
        let err = convert(&image, strategy, &options(pairs)).unwrap_err();
        assert!(matches!(err, AsciiError::InvalidOption { .. }), "{strategy} {pairs:?}");
        assert!(!err.is_image_load());
    }
}

#[test]
fn undecodable_bytes_are_image_load_errors() {
    let conversion = Conversion::from_options(StrategyKind::Brightness, &ConvertOptions::default())
        .unwrap();
    let err = AsciiRenderer.render_bytes(b"not an image", &conversion).unwrap_err();
    assert!(err.is_image_load());

    let err = RasterImage::from_raw(3, 3, 3, vec![0; 5]).unwrap_err();
    assert!(err.is_image_load());
}

#[test]
fn identity_tone_adjustment_is_a_no_op() {
    let mut rng = StdRng::seed_from_u64(7);
    let image = random_rgb(&mut rng);
    let (width, _) = image.dimensions();
    let width = width.to_string();

    let plain = convert(&image, "brightness", &options(&[("width", &width)])).unwrap();
    let adjusted = convert(
        &image,
        "brightness",
        &options(&[("width", &width), ("contrast", "1.0"), ("brightness", "1.0")]),
    )
    .unwrap();
    assert_eq!(plain, adjusted);
}

#[test]
fn charsets_change_the_ramp() {
    let image = solid_rgb(4, 4, 0);
    let simple = convert(&image, "brightness", &options(&[("width", "4"), ("charset", "simple")]))
        .unwrap();
    assert!(simple.cells.iter().all(|&c| c == GlyphRamp::simple().first()));

    let extended =
        convert(&image, "dithering", &options(&[("width", "4"), ("charset", "extended")]))
            .unwrap();
    assert!(extended.cells.iter().all(|&c| c == GlyphRamp::extended().first()));
}
