//! End-to-end shaping over a hand-built test font
//!
//! The font covers `a`..`z` plus a slice of the Arabic block through a
//! format 12 cmap, carries real metrics, and a GSUB ligature lookup that
//! turns `f` + `i` into one glyph under `liga`.

use textshape::{
    shape, Buffer, ContentType, Direction, Face, Feature, Font, Language, RawFace, Script, Tag,
};

const LIG_GLYPH: u16 = 33;

struct TestFont {
    tables: Vec<(Tag, Vec<u8>)>,
}

impl RawFace for TestFont {
    fn table(&self, tag: Tag) -> Option<&[u8]> {
        self.tables.iter().find(|(t, _)| *t == tag).map(|(_, d)| d.as_slice())
    }
}

fn head_table() -> Vec<u8> {
    let mut head = vec![0u8; 54];
    head[18..20].copy_from_slice(&1000u16.to_be_bytes());
    head
}

fn maxp_table(glyphs: u16) -> Vec<u8> {
    let mut maxp = vec![0u8; 6];
    maxp[4..6].copy_from_slice(&glyphs.to_be_bytes());
    maxp
}

fn hhea_table(metrics: u16) -> Vec<u8> {
    let mut hhea = vec![0u8; 36];
    hhea[34..36].copy_from_slice(&metrics.to_be_bytes());
    hhea
}

fn hmtx_table(count: u16) -> Vec<u8> {
    let mut hmtx = Vec::new();
    for glyph in 0..count {
        let advance: u16 = match glyph {
            0 => 500,
            LIG_GLYPH => 800,
            40.. => 700,
            _ => 600,
        };
        hmtx.extend_from_slice(&advance.to_be_bytes());
        hmtx.extend_from_slice(&0u16.to_be_bytes());
    }
    hmtx
}

/// Format 12 cmap: `a`..`z` -> 1..26, U+0621..U+064A -> 40..
fn cmap_table() -> Vec<u8> {
    let mut t = Vec::new();
    t.extend_from_slice(&0u16.to_be_bytes()); // version
    t.extend_from_slice(&1u16.to_be_bytes()); // numTables
    t.extend_from_slice(&3u16.to_be_bytes()); // platform
    t.extend_from_slice(&10u16.to_be_bytes()); // encoding
    t.extend_from_slice(&12u32.to_be_bytes()); // subtable offset

    let groups: &[(u32, u32, u32)] = &[(0x61, 0x7A, 1), (0x0621, 0x064A, 40)];
    t.extend_from_slice(&12u16.to_be_bytes()); // format
    t.extend_from_slice(&0u16.to_be_bytes()); // reserved
    t.extend_from_slice(&((16 + groups.len() * 12) as u32).to_be_bytes());
    t.extend_from_slice(&0u32.to_be_bytes()); // language
    t.extend_from_slice(&(groups.len() as u32).to_be_bytes());
    for &(start, end, glyph) in groups {
        t.extend_from_slice(&start.to_be_bytes());
        t.extend_from_slice(&end.to_be_bytes());
        t.extend_from_slice(&glyph.to_be_bytes());
    }
    t
}

/// GSUB with a DFLT script and one `liga` feature: f + i -> LIG_GLYPH
fn gsub_table() -> Vec<u8> {
    let mut t = Vec::new();
    t.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    t.extend_from_slice(&10u16.to_be_bytes()); // scriptList
    t.extend_from_slice(&40u16.to_be_bytes()); // featureList
    t.extend_from_slice(&60u16.to_be_bytes()); // lookupList

    // scriptList @10: 1 record, DFLT -> script table @8 (relative)
    t.extend_from_slice(&1u16.to_be_bytes());
    t.extend_from_slice(b"DFLT");
    t.extend_from_slice(&8u16.to_be_bytes());
    // script table @18: defaultLangSys @6, langSysCount 0, pad
    t.extend_from_slice(&6u16.to_be_bytes());
    t.extend_from_slice(&0u16.to_be_bytes());
    t.extend_from_slice(&0u16.to_be_bytes());
    // langSys @24: order 0, required none, 1 feature: index 0
    t.extend_from_slice(&0u16.to_be_bytes());
    t.extend_from_slice(&0xFFFFu16.to_be_bytes());
    t.extend_from_slice(&1u16.to_be_bytes());
    t.extend_from_slice(&0u16.to_be_bytes());
    while t.len() < 40 {
        t.push(0);
    }

    // featureList @40: 1 record, liga -> feature table @10 (relative)
    t.extend_from_slice(&1u16.to_be_bytes());
    t.extend_from_slice(b"liga");
    t.extend_from_slice(&10u16.to_be_bytes());
    t.extend_from_slice(&0u16.to_be_bytes()); // pad so feature table starts at 50
    // feature table @50: params 0, 1 lookup: index 0
    t.extend_from_slice(&0u16.to_be_bytes());
    t.extend_from_slice(&1u16.to_be_bytes());
    t.extend_from_slice(&0u16.to_be_bytes());
    while t.len() < 60 {
        t.push(0);
    }

    // lookupList @60: 1 lookup @4 (relative)
    t.extend_from_slice(&1u16.to_be_bytes());
    t.extend_from_slice(&4u16.to_be_bytes());
    // lookup @64: type 4, flag 0, 1 subtable @8 (relative)
    t.extend_from_slice(&4u16.to_be_bytes());
    t.extend_from_slice(&0u16.to_be_bytes());
    t.extend_from_slice(&1u16.to_be_bytes());
    t.extend_from_slice(&8u16.to_be_bytes());
    // ligature subtable @72 (offsets relative to 72)
    t.extend_from_slice(&1u16.to_be_bytes()); // format
    t.extend_from_slice(&10u16.to_be_bytes()); // coverage @+10
    t.extend_from_slice(&1u16.to_be_bytes()); // setCount
    t.extend_from_slice(&16u16.to_be_bytes()); // set @+16
    t.extend_from_slice(&[0u8; 2]); // pad
    // coverage @82: format 1, glyph 6 ('f')
    t.extend_from_slice(&[0x00, 0x01, 0x00, 0x01, 0x00, 0x06]);
    // ligature set @88: 1 ligature @+4
    t.extend_from_slice(&1u16.to_be_bytes());
    t.extend_from_slice(&4u16.to_be_bytes());
    // ligature @92: LIG_GLYPH, 2 components, second is 'i' (glyph 9)
    t.extend_from_slice(&LIG_GLYPH.to_be_bytes());
    t.extend_from_slice(&2u16.to_be_bytes());
    t.extend_from_slice(&9u16.to_be_bytes());
    t
}

fn kern_table() -> Vec<u8> {
    // One horizontal format 0 pair: 'a' (1) before 'b' (2) kerns -100.
    let mut t = Vec::new();
    t.extend_from_slice(&0u16.to_be_bytes());
    t.extend_from_slice(&1u16.to_be_bytes());
    t.extend_from_slice(&0u16.to_be_bytes());
    t.extend_from_slice(&20u16.to_be_bytes());
    t.extend_from_slice(&0x0001u16.to_be_bytes());
    t.extend_from_slice(&1u16.to_be_bytes());
    t.extend_from_slice(&[0u8; 6]);
    t.extend_from_slice(&1u16.to_be_bytes());
    t.extend_from_slice(&2u16.to_be_bytes());
    t.extend_from_slice(&(-100i16).to_be_bytes());
    t
}

fn test_font(with_gsub: bool, with_kern: bool) -> TestFont {
    let mut tables = vec![
        (Tag::from_bytes(b"head"), head_table()),
        (Tag::from_bytes(b"maxp"), maxp_table(64)),
        (Tag::from_bytes(b"hhea"), hhea_table(64)),
        (Tag::from_bytes(b"hmtx"), hmtx_table(64)),
        (Tag::from_bytes(b"cmap"), cmap_table()),
    ];
    if with_gsub {
        tables.push((Tag::GSUB, gsub_table()));
    }
    if with_kern {
        tables.push((Tag::from_bytes(b"kern"), kern_table()));
    }
    TestFont { tables }
}

fn shape_str(font: &Font<'_>, text: &str, features: &[Feature]) -> Buffer {
    let mut buf = Buffer::new();
    buf.add_str(text).unwrap();
    shape(font, &mut buf, features).unwrap();
    buf
}

#[test]
fn empty_buffer_shapes_without_error() {
    let raw = test_font(true, false);
    let face = Face::new(&raw);
    let font = Font::create(&face, 1000);
    let mut buf = Buffer::new();
    shape(&font, &mut buf, &[]).unwrap();
    assert_eq!(buf.content_type(), ContentType::Glyphs);
    assert!(buf.glyph_infos().is_empty());
    assert_eq!(buf.total_advance(), 0);
}

#[test]
fn basic_latin_maps_and_advances() {
    let raw = test_font(true, false);
    let face = Face::new(&raw);
    let font = Font::create(&face, 1000);
    let buf = shape_str(&font, "abc", &[]);
    let glyphs: Vec<u32> = buf.glyph_infos().iter().map(|i| i.codepoint).collect();
    assert_eq!(glyphs, vec![1, 2, 3]);
    assert_eq!(buf.total_advance(), 1800);
}

#[test]
fn uncovered_codepoint_becomes_notdef_and_keeps_cluster() {
    let raw = test_font(true, false);
    let face = Face::new(&raw);
    let font = Font::create(&face, 1000);
    let buf = shape_str(&font, "a\u{00A2}b", &[]);
    let infos = buf.glyph_infos();
    assert_eq!(infos.len(), 3);
    assert_eq!(infos[1].codepoint, 0);
    assert_eq!(infos[1].cluster, 1);
}

#[test]
fn ltr_clusters_are_non_decreasing() {
    let raw = test_font(true, false);
    let face = Face::new(&raw);
    let font = Font::create(&face, 1000);
    let buf = shape_str(&font, "office", &[]);
    let clusters: Vec<u32> = buf.glyph_infos().iter().map(|i| i.cluster).collect();
    assert!(clusters.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn ligature_merges_clusters_and_shrinks_output() {
    let raw = test_font(true, false);
    let face = Face::new(&raw);
    let font = Font::create(&face, 1000);
    let buf = shape_str(&font, "fin", &[]);
    let infos = buf.glyph_infos();
    assert_eq!(infos.len(), 2);
    assert_eq!(infos[0].codepoint, LIG_GLYPH as u32);
    assert_eq!(infos[0].cluster, 0);
    assert_eq!(infos[1].cluster, 2);
    // Ligature advance replaces both components'.
    assert_eq!(buf.total_advance(), 800 + 600);
}

#[test]
fn liga_disable_keeps_components() {
    let raw = test_font(true, false);
    let face = Face::new(&raw);
    let font = Font::create(&face, 1000);
    let off: Feature = "liga=0".parse().unwrap();
    let buf = shape_str(&font, "fi", &[off]);
    assert_eq!(buf.glyph_infos().len(), 2);
}

#[test]
fn ranged_disable_applies_per_cluster() {
    let raw = test_font(true, false);
    let face = Face::new(&raw);
    let font = Font::create(&face, 1000);
    // Ligation off over the first two characters only.
    let partial: Feature = "liga=0=0:2".parse().unwrap();
    let buf = shape_str(&font, "fifi", &[partial]);
    let glyphs: Vec<u32> = buf.glyph_infos().iter().map(|i| i.codepoint).collect();
    assert_eq!(glyphs, vec![6, 9, LIG_GLYPH as u32]);
}

#[test]
fn zero_width_feature_range_changes_nothing() {
    let raw = test_font(true, false);
    let face = Face::new(&raw);
    let font = Font::create(&face, 1000);
    let noop: Feature = "liga=0=1:1".parse().unwrap();
    let plain = shape_str(&font, "fi", &[]);
    let with_noop = shape_str(&font, "fi", &[noop]);
    assert_eq!(plain.glyph_infos(), with_noop.glyph_infos());
    assert_eq!(plain.glyph_positions(), with_noop.glyph_positions());
}

#[test]
fn arabic_guesses_rtl_and_reverses_output() {
    let raw = test_font(true, false);
    let face = Face::new(&raw);
    let font = Font::create(&face, 1000);
    let mut buf = Buffer::new();
    buf.add_str("\u{0633}\u{0644}\u{0645}").unwrap();
    shape(&font, &mut buf, &[]).unwrap();
    assert_eq!(buf.direction(), Some(Direction::RightToLeft));
    assert_eq!(buf.script(), Some(Script::Arabic));
    let clusters: Vec<u32> = buf.glyph_infos().iter().map(|i| i.cluster).collect();
    assert!(clusters.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(clusters, vec![2, 1, 0]);
}

#[test]
fn unknown_languages_share_default_output() {
    let raw = test_font(true, false);
    let face = Face::new(&raw);
    let font = Font::create(&face, 1000);

    let mut first = Buffer::new();
    first.add_str("fi").unwrap();
    first.set_language(Language(Tag::from_bytes(b"XXX ")));
    shape(&font, &mut first, &[]).unwrap();

    let mut second = Buffer::new();
    second.add_str("fi").unwrap();
    second.set_language(Language(Tag::from_bytes(b"YYY ")));
    shape(&font, &mut second, &[]).unwrap();

    assert_eq!(first.glyph_infos(), second.glyph_infos());
    assert_eq!(first.glyph_positions(), second.glyph_positions());
    assert_eq!(first.glyph_infos()[0].codepoint, LIG_GLYPH as u32);
}

#[test]
fn reset_and_reuse_gives_identical_results() {
    let raw = test_font(true, false);
    let face = Face::new(&raw);
    let font = Font::create(&face, 1000);

    let mut buf = Buffer::new();
    buf.add_str("fine").unwrap();
    shape(&font, &mut buf, &[]).unwrap();
    let first_glyphs: Vec<u32> = buf.glyph_infos().iter().map(|i| i.codepoint).collect();
    let first_advance = buf.total_advance();

    buf.reset();
    buf.add_str("fine").unwrap();
    shape(&font, &mut buf, &[]).unwrap();
    let second_glyphs: Vec<u32> = buf.glyph_infos().iter().map(|i| i.codepoint).collect();
    assert_eq!(first_glyphs, second_glyphs);
    assert_eq!(first_advance, buf.total_advance());
}

#[test]
fn legacy_kern_applies_without_gpos() {
    let raw = test_font(false, true);
    let face = Face::new(&raw);
    let font = Font::create(&face, 1000);
    let buf = shape_str(&font, "ab", &[]);
    assert_eq!(buf.glyph_positions()[0].x_advance, 500);
    assert_eq!(buf.glyph_positions()[1].x_advance, 600);
}

#[test]
fn adding_text_after_shaping_is_an_error() {
    let raw = test_font(true, false);
    let face = Face::new(&raw);
    let font = Font::create(&face, 1000);
    let mut buf = Buffer::new();
    buf.add_str("a").unwrap();
    shape(&font, &mut buf, &[]).unwrap();
    assert!(buf.add_str("b").is_err());
    assert_eq!(buf.content_type(), ContentType::Invalid);
}

#[test]
fn scaling_halves_advances() {
    let raw = test_font(true, false);
    let face = Face::new(&raw);
    let font = Font::create(&face, 500);
    let buf = shape_str(&font, "a", &[]);
    assert_eq!(buf.glyph_positions()[0].x_advance, 300);
}
