//! HTML entity decoding for legacy CRM text fields.
//!
//! The CRM stores some place names (regions especially) HTML-escaped, e.g.
//! `Regi&oacute;n del B&iacute;o B&iacute;o`. Unknown entities are left as-is.

const NAMED_ENTITIES: &[(&str, char)] = &[
    ("aacute", 'á'),
    ("eacute", 'é'),
    ("iacute", 'í'),
    ("oacute", 'ó'),
    ("uacute", 'ú'),
    ("Aacute", 'Á'),
    ("Eacute", 'É'),
    ("Iacute", 'Í'),
    ("Oacute", 'Ó'),
    ("Uacute", 'Ú'),
    ("agrave", 'à'),
    ("egrave", 'è'),
    ("ntilde", 'ñ'),
    ("Ntilde", 'Ñ'),
    ("uuml", 'ü'),
    ("Uuml", 'Ü'),
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("ordf", 'ª'),
    ("ordm", 'º'),
    ("deg", '°'),
    ("nbsp", ' '),
    ("iexcl", '¡'),
    ("iquest", '¿'),
];

/// Longest entity body we bother scanning for (`&iquest;` is the longest name).
const MAX_ENTITY_LEN: usize = 10;

/// Decode named and numeric (`&#243;`, `&#xF3;`) HTML entities.
pub fn decode_html_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp + 1..];

        let decoded = candidate
            .find(';')
            .filter(|semi| *semi > 0 && *semi <= MAX_ENTITY_LEN)
            .and_then(|semi| decode_entity(&candidate[..semi]).map(|ch| (ch, semi)));

        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &candidate[semi + 1..];
            }
            None => {
                out.push('&');
                rest = candidate;
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(body: &str) -> Option<char> {
    if let Some(numeric) = body.strip_prefix('#') {
        let code = match numeric.strip_prefix('x').or_else(|| numeric.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }

    NAMED_ENTITIES
        .iter()
        .find(|(name, _)| *name == body)
        .map(|(_, ch)| *ch)
}
