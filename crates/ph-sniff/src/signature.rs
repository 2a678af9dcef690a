//! The magic-number signature table.
//!
//! Order matters: [`classify`](crate::classify) reports the first entry that
//! matches. Longer, more specific signatures come before short ones such as
//! BMP's two-byte `BM`.

use crate::ImageFormat;

/// How a signature recognises its prefix.
pub(crate) enum Matcher {
    /// Every `(offset, bytes)` part must appear at its offset.
    Parts(&'static [(usize, &'static [u8])]),
    /// Netpbm header: `P`, one of the given digits, then ASCII whitespace.
    Netpbm(&'static [u8]),
}

pub(crate) struct Signature {
    pub(crate) format: ImageFormat,
    matcher: Matcher,
}

impl Signature {
    const fn parts(format: ImageFormat, parts: &'static [(usize, &'static [u8])]) -> Self {
        Self {
            format,
            matcher: Matcher::Parts(parts),
        }
    }

    pub(crate) fn matches(&self, prefix: &[u8]) -> bool {
        match self.matcher {
            Matcher::Parts(parts) => parts.iter().all(|(offset, bytes)| {
                prefix
                    .get(*offset..*offset + bytes.len())
                    .is_some_and(|window| window == *bytes)
            }),
            Matcher::Netpbm(digits) => match prefix {
                [b'P', digit, ws, ..] => digits.contains(digit) && ws.is_ascii_whitespace(),
                _ => false,
            },
        }
    }

    /// Number of leading bytes this signature needs to see.
    const fn span(&self) -> usize {
        match self.matcher {
            Matcher::Parts(parts) => {
                let mut max = 0;
                let mut i = 0;
                while i < parts.len() {
                    let end = parts[i].0 + parts[i].1.len();
                    if end > max {
                        max = end;
                    }
                    i += 1;
                }
                max
            }
            Matcher::Netpbm(_) => 3,
        }
    }
}

pub(crate) const SIGNATURES: &[Signature] = &[
    Signature::parts(
        ImageFormat::Png,
        &[(0, &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])],
    ),
    Signature::parts(ImageFormat::Jpeg, &[(0, &[0xFF, 0xD8, 0xFF])]),
    Signature::parts(ImageFormat::Gif, &[(0, b"GIF8")]),
    Signature::parts(ImageFormat::Webp, &[(0, b"RIFF"), (8, b"WEBP")]),
    // ISO-BMFF: box size, then `ftyp` and the major brand
    Signature::parts(ImageFormat::Avif, &[(4, b"ftyp"), (8, b"avif")]),
    Signature::parts(ImageFormat::Avif, &[(4, b"ftyp"), (8, b"avis")]),
    Signature::parts(ImageFormat::Heic, &[(4, b"ftyp"), (8, b"heic")]),
    Signature::parts(ImageFormat::Heic, &[(4, b"ftyp"), (8, b"heix")]),
    Signature::parts(ImageFormat::Heic, &[(4, b"ftyp"), (8, b"mif1")]),
    Signature::parts(ImageFormat::Heic, &[(4, b"ftyp"), (8, b"msf1")]),
    Signature::parts(ImageFormat::Tiff, &[(0, b"II*\0")]),
    Signature::parts(ImageFormat::Tiff, &[(0, b"MM\0*")]),
    Signature::parts(ImageFormat::Exr, &[(0, &[0x76, 0x2F, 0x31, 0x01])]),
    Signature::parts(ImageFormat::Ico, &[(0, &[0x00, 0x00, 0x01, 0x00])]),
    Signature::parts(ImageFormat::SunRaster, &[(0, &[0x59, 0xA6, 0x6A, 0x95])]),
    Signature::parts(ImageFormat::Xbm, &[(0, b"#define ")]),
    Signature {
        format: ImageFormat::Pbm,
        matcher: Matcher::Netpbm(b"14"),
    },
    Signature {
        format: ImageFormat::Pgm,
        matcher: Matcher::Netpbm(b"25"),
    },
    Signature {
        format: ImageFormat::Ppm,
        matcher: Matcher::Netpbm(b"36"),
    },
    Signature::parts(ImageFormat::SgiRgb, &[(0, &[0x01, 0xDA])]),
    Signature::parts(ImageFormat::Bmp, &[(0, b"BM")]),
];

const fn max_span(table: &[Signature]) -> usize {
    let mut max = 0;
    let mut i = 0;
    while i < table.len() {
        let span = table[i].span();
        if span > max {
            max = span;
        }
        i += 1;
    }
    max
}

/// Longest prefix any signature inspects.
pub const SNIFF_LEN: usize = max_span(SIGNATURES);
