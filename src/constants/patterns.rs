// Pattern tables consulted by the response sanitizer and the string sanitizer.
// All entries are regular expressions matched against text that has already
// been diacritic-normalized and lower-cased.

/// Lines matching any of these never reach the transcript.
pub const LEAK_PATTERNS: &[&str] = &[
    r"\bupdate_quiz\b",
    r"\bgenerate_cover_image\b",
    r"\bgenerate_outcome_image\b",
    r"\btool[ _-]?calls?\b",
    r"\bfunction[ _-]?calls?\b",
    r"\bchamadas? de (ferramenta|funcao)\b",
    r"\binternal context\b",
    r"\bcontexto interno\b",
    r"\bsystem prompt\b",
    r"\bprompt do sistema\b",
    r"\buser (has )?confirmed\b",
    r"\b(o )?usuario (ja )?confirmou\b",
    r"\bi (will|should|need to|must) call\b",
    r"\bvou (chamar|usar) a ferramenta\b",
    r"^\s*(thinking|reasoning|pensando|raciocinio)\s*:",
];

/// Regions between this marker pair are private notes to self.
pub const PRIVATE_NOTE_START: &str = "[internal]";
pub const PRIVATE_NOTE_END: &str = "[/internal]";

/// Confirmation line the model tends to repeat; only the first one survives.
pub const CONFIRMATION_PATTERNS: &[&str] = &[r"^\W*quiz (updated|atualizado)\b"];

/// Whole-value tokens that mean "nothing".
pub const NULLISH_TOKENS: &[&str] = &[
    r"^(none|null|nil|undefined|n/a|na|n\.a\.|-|--|nenhum|nenhuma|vazio|empty)$",
];

/// Words that show up when the model echoes a schema instead of filling it in.
pub const PLACEHOLDER_KEYWORDS: &[&str] = &[
    r"string",
    r"url",
    r"texto",
    r"text",
    r"description",
    r"descricao",
    r"link",
    r"image",
    r"imagem",
];

/// Qualifiers that turn a placeholder keyword into a schema echo regardless of length.
pub const PLACEHOLDER_QUALIFIERS: &[&str] = &[r"\boptional\b", r"\bopcional\b"];

/// A value carrying a placeholder keyword at or below this many characters is rejected.
pub const PLACEHOLDER_MAX_LEN: usize = 6;

/// Domains that never host real content.
pub const FAKE_DOMAINS: &[&str] = &[
    r"example\.com",
    r"example\.org",
    r"example\.net",
    r"placeholder\.com",
    r"placehold\.co",
    r"via\.placeholder",
    r"dummyimage\.com",
    r"yourdomain",
    r"your-domain",
    r"seusite",
    r"seudominio",
];

/// Prefixes that mark a value as a real link rather than prose.
pub const URL_PREFIXES: &[&str] = &["http://", "https://", "data:image/"];
