use std::collections::HashSet;
use std::sync::LazyLock;

const INDONESIAN: &[&str] = &[
    "ada", "adalah", "agar", "akan", "aku", "amat", "anda", "antara", "apa", "apakah", "atas",
    "atau", "bagi", "bahkan", "bahwa", "banget", "begitu", "belum", "beberapa", "berapa",
    "bisa", "boleh", "bukan", "dalam", "dan", "dari", "daripada", "dengan", "di", "dia",
    "dong", "hanya", "harus", "ia", "ini", "itu", "jadi", "jika", "juga", "jangan", "kalau",
    "kami", "kamu", "karena", "ke", "kita", "kok", "lagi", "lah", "maka", "mau", "masih",
    "melalui", "memang", "mereka", "nya", "oleh", "pada", "para", "pun", "saja", "sama",
    "sampai", "sangat", "saya", "secara", "sedang", "sekali", "sekarang", "semua", "sudah",
    "supaya", "tapi", "telah", "tentang", "terhadap", "terlalu", "tersebut", "terus",
    "tetapi", "tidak", "untuk", "waktu", "yang", "yuk", "sih", "deh", "nih", "kan", "ya",
    "gitu", "aja", "tuh",
];

const ENGLISH: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "am", "an", "and", "any", "are", "as",
    "at", "be", "because", "been", "before", "being", "below", "between", "both", "but", "by",
    "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "him",
    "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "me", "more", "most",
    "my", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our",
    "out", "over", "own", "same", "she", "should", "so", "some", "such", "than", "that",
    "the", "their", "them", "then", "there", "these", "they", "this", "those", "through",
    "to", "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where",
    "which", "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours",
];

static STOPWORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| INDONESIAN.iter().chain(ENGLISH).copied().collect());

/// Whether `word` (already lowercased) is an Indonesian or English stopword.
#[must_use]
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}
