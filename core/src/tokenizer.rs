use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\b\w\w+\b").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","across","after","afterwards","again","against","all","almost","alone","along","already","also","although","always","am","among","amongst","an","and","another","any","anyhow","anyone","anything","anyway","anywhere","are","around","as","at",
            "back","be","became","because","become","becomes","becoming","been","before","beforehand","behind","being","below","beside","besides","between","beyond","both","but","by",
            "can","cannot","could","couldnt",
            "did","do","does","doing","done","down","due","during",
            "each","eg","either","else","elsewhere","enough","etc","even","ever","every","everyone","everything","everywhere","except",
            "few","for","former","formerly","from","further",
            "get","give","go",
            "had","has","hasnt","have","having","he","hence","her","here","hereafter","hereby","herein","hereupon","hers","herself","him","himself","his","how","however",
            "i","ie","if","in","inc","indeed","into","is","it","its","itself",
            "just","keep","last","latter","latterly","least","less","ltd",
            "made","many","may","me","meanwhile","might","mine","more","moreover","most","mostly","much","must","my","myself",
            "namely","neither","never","nevertheless","next","no","nobody","none","noone","nor","not","nothing","now","nowhere",
            "of","off","often","on","once","only","onto","or","other","others","otherwise","ought","our","ours","ourselves","out","over","own",
            "per","perhaps","please","put",
            "rather","re",
            "same","see","seem","seemed","seeming","seems","several","she","should","since","so","some","somehow","someone","something","sometime","sometimes","somewhere","still","such",
            "than","that","the","their","theirs","them","themselves","then","thence","there","thereafter","thereby","therefore","therein","thereupon","these","they","this","those","though","through","throughout","thru","thus","to","together","too","toward","towards",
            "under","until","up","upon","us",
            "very","via",
            "was","we","well","were","what","whatever","when","whence","whenever","where","whereafter","whereas","whereby","wherein","whereupon","wherever","whether","which","while","whither","who","whoever","whole","whom","whose","why","will","with","within","without","would",
            "yet","you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Split text into lowercase word tokens using NFKC normalization and stopword removal.
///
/// Tokens are runs of two or more word characters; single letters are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized)
        .map(|m| m.as_str())
        .filter(|t| !is_stopword(t))
        .map(str::to_string)
        .collect()
}

/// Expand tokens into n-gram terms for every n in `1..=max_n`.
///
/// Unigrams come first, then bigrams, and so on. Higher-order terms join
/// adjacent surviving tokens with a single space.
pub fn ngrams(tokens: &[String], max_n: usize) -> Vec<String> {
    let mut terms = Vec::with_capacity(tokens.len() * max_n.max(1));
    terms.extend(tokens.iter().cloned());
    for n in 2..=max_n {
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}

/// Tokenize and expand in one step.
pub fn terms(text: &str, max_n: usize) -> Vec<String> {
    ngrams(&tokenize(text), max_n)
}
