use crate::countries::LANGUAGES;
use crate::models::NewsItem;

/// Concatenate news tuples into the context block shared by every prompt:
/// `"{title}. {description}"`, one article per paragraph.
pub fn news_context(news: &[NewsItem]) -> String {
    news.iter()
        .filter(|item| !item.title.is_empty())
        .map(|item| format!("{}. {}", item.title, item.description))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Prompt for combined mode: one completion carrying all seven languages,
/// each section headed by its exact uppercase marker so the response can be
/// split back apart.
pub fn combined_prompt(keyword: &str, news_text: &str, country_name: &str) -> String {
    let sections = LANGUAGES
        .iter()
        .map(|lang| format!("{} <2-3 sentence explanation in {}>", lang.marker, lang.name))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a trending keyword analyst. Based on the news articles provided, \
explain why \"{keyword}\" is trending in {country_name}.

Related news:
{news_text}

Requirements:
1. Write a concise 2-3 sentence explanation for EACH language listed below
2. Focus ONLY on factual information from the news articles
3. Do NOT speculate or make assumptions
4. Head each section with its exact marker, on its own line, in this order:

{sections}

Provide ONLY the marker-headed sections, no additional formatting."
    )
}

pub const COMBINED_SYSTEM_PROMPT: &str =
    "You are a professional news analyst. You respond in multiple languages, each section headed by its exact marker.";

pub fn per_language_system_prompt(language_name: &str) -> String {
    format!("You are a professional news analyst. Always respond in {language_name}.")
}

/// Language-specific prompt for per-language mode. Each language gets its
/// instructions in that language; anything unrecognized falls back to the
/// English wording.
pub fn per_language_prompt(lang_code: &str, keyword: &str, news_text: &str, country_name: &str) -> String {
    match lang_code {
        "ko" => format!(
            "당신은 글로벌 트렌드 분석 전문가입니다.

키워드: \"{keyword}\"
국가: {country_name}

관련 뉴스:
{news_text}

위 뉴스 내용을 바탕으로, 이 키워드가 {country_name}에서 왜 인기 검색어가 되었는지 분석해주세요.

작성 규칙:
1. 구체적인 사건, 인물, 날짜, 수치만 작성
2. 추측이나 일반론 금지 - 오직 뉴스에 나온 사실만
3. 3-4문장으로 간결하게
4. 한국어로 작성

설명만 작성하세요."
        ),
        "ja" => format!(
            "あなたはトレンドキーワードアナリストです。ニュース記事に基づいて、なぜ「{keyword}」が{country_name}でトレンドになっているかを説明してください。

関連ニュース:
{news_text}

要件:
1. 2-3文で簡潔に日本語で説明
2. ニュース記事の事実のみに焦点を当てる
3. 推測や仮定は禁止
4. 自然で明確に書く

説明のみを記述してください。"
        ),
        "de" => format!(
            "Sie sind ein Trendschlüsselwort-Analyst. Basierend auf den bereitgestellten Nachrichtenartikeln erklären Sie, warum \"{keyword}\" in {country_name} im Trend liegt.

Verwandte Nachrichten:
{news_text}

Anforderungen:
1. Schreiben Sie eine prägnante 2-3-Satz-Erklärung auf Deutsch
2. Konzentrieren Sie sich NUR auf faktische Informationen aus den Nachrichtenartikeln
3. Spekulieren oder vermuten Sie NICHT
4. Schreiben Sie natürlich und klar

Geben Sie NUR den Erklärungstext an."
        ),
        "fr" => format!(
            "Vous êtes un analyste de mots-clés tendance. Sur la base des articles de presse fournis, expliquez pourquoi \"{keyword}\" est tendance en {country_name}.

Actualités connexes:
{news_text}

Exigences:
1. Rédigez une explication concise de 2-3 phrases en français
2. Concentrez-vous UNIQUEMENT sur les informations factuelles des articles de presse
3. NE spéculez PAS et ne faites PAS d'hypothèses
4. Écrivez naturellement et clairement

Fournissez UNIQUEMENT le texte d'explication."
        ),
        "no" => format!(
            "Du er en trendnøkkelordanalytiker. Basert på de gitte nyhetsartiklene, forklar hvorfor \"{keyword}\" er trending i {country_name}.

Relaterte nyheter:
{news_text}

Krav:
1. Skriv en kortfattet 2-3 setningsforklaring på norsk
2. Fokuser KUN på faktainformasjon fra nyhetsartiklene
3. IKKE spekuler eller gjør antagelser
4. Skriv naturlig og tydelig

Oppgi KUN forklaringsteksten."
        ),
        "sv" => format!(
            "Du är en trendnyckelordsanalytiker. Baserat på de tillhandahållna nyhetsartiklarna, förklara varför \"{keyword}\" trendar i {country_name}.

Relaterade nyheter:
{news_text}

Krav:
1. Skriv en kortfattad 2-3 meningsförklaring på svenska
2. Fokusera ENDAST på faktainformation från nyhetsartiklarna
3. Spekulera INTE eller gör antaganden
4. Skriv naturligt och tydligt

Ange ENDAST förklaringstexten."
        ),
        _ => format!(
            "You are a trending keyword analyst. Based on the news articles provided, explain why \"{keyword}\" is trending in {country_name}.

Related news:
{news_text}

Requirements:
1. Write a concise 2-3 sentence explanation in English
2. Focus ONLY on factual information from the news articles
3. Do NOT speculate or make assumptions
4. If no news context is provided, give a general but factual explanation
5. Write naturally and clearly

Provide ONLY the explanation text, no additional formatting."
        ),
    }
}
