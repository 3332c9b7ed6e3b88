//! Localized canned replies for every terminal pipeline branch.

use rand::Rng;

use crate::language::SupportedLanguage;
use crate::leaderboard::Scope;

struct ReplyPool {
    en: &'static [&'static str],
    uz: &'static [&'static str],
    ru: &'static [&'static str],
}

impl ReplyPool {
    fn pick(&self, language: SupportedLanguage) -> String {
        let options = match language {
            SupportedLanguage::En => self.en,
            SupportedLanguage::Uz => self.uz,
            SupportedLanguage::Ru => self.ru,
        };
        let options = if options.is_empty() { self.en } else { options };
        if options.is_empty() {
            return String::new();
        }
        let index = rand::thread_rng().gen_range(0..options.len());
        options[index].to_string()
    }
}

const OFF_TOPIC: ReplyPool = ReplyPool {
    en: &[
        "Hey superstar! I’m here to help with anything related to this website. Ask about features, pages, or how things work here ✨",
        "Love the curiosity, but I’m laser-focused on this site. Hit me with a question about our tools or pages!",
    ],
    uz: &[
        "Salom! Men aynan shu sayt bo‘yicha yordam beraman. Sahifalar, funksiyalar va bu yerdagi ish tartibi haqida so‘rashingiz mumkin ✨",
        "Zo‘r savol, lekin men bu sayt mavzulariga ixtisoslashganman. Shu yerdagi imkoniyatlar haqida so‘rashing!",
    ],
    ru: &[
        "Привет! Я подсказываю только по этому сайту. Спроси про его разделы, функции или как тут всё устроено ✨",
        "Классный вопрос, но я отвечаю только про этот сайт. Напиши, что хочешь узнать о разделах или возможностях здесь!",
    ],
};

const MODERATION: ReplyPool = ReplyPool {
    en: &["I want to keep things positive and on-topic, so let’s stick to questions about this site."],
    uz: &["Hammasi xavfsiz qolishi uchun, iltimos, shu saytga oid mavzular bilan davom etamiz."],
    ru: &["Поддерживаю только спокойные и безопасные темы. Давай обсудим что-нибудь по сайту."],
};

const ERROR: ReplyPool = ReplyPool {
    en: &["Uh oh, something glitchy happened. Ask me again in a moment and I’ll be ready!"],
    uz: &["Afsuski, kichik nosozlik yuz berdi. Birozdan so‘ng yana so‘rab ko‘ring!"],
    ru: &["Поймал глюк. Спроси ещё раз через минутку — я снова буду в строю!"],
};

const PAUSED: ReplyPool = ReplyPool {
    en: &["The assistant is taking a short break right now. Check back soon — your questions will be waiting!"],
    uz: &["Yordamchi hozircha pauzada. Birozdan so‘ng qaytib keling — savollaringizga javob beraman!"],
    ru: &["Ассистент сейчас на паузе. Загляни чуть позже — я обязательно отвечу!"],
};

const REFUSAL_PERSONAL: ReplyPool = ReplyPool {
    en: &["I can't look up personal data or account stats here. Your own dashboard has all of that — check the profile and progress pages!"],
    uz: &["Shaxsiy ma’lumotlar va hisob statistikasini bu yerda ko‘rsata olmayman. Bularning hammasi shaxsiy kabinetingizda bor!"],
    ru: &["Я не показываю личные данные и статистику аккаунта. Всё это есть в твоём личном кабинете на страницах профиля и прогресса!"],
};

const REFUSAL_ADMIN: ReplyPool = ReplyPool {
    en: &["Admin tools, configuration and infrastructure details are off limits for me. Ask me about the site's features instead!"],
    uz: &["Admin vositalari va ichki sozlamalar haqida gapira olmayman. Sayt funksiyalari haqida so‘rang!"],
    ru: &["Про админ-инструменты и внутренние настройки я не рассказываю. Спроси лучше про возможности сайта!"],
};

const LEADERBOARD_MISSING_DATE: ReplyPool = ReplyPool {
    en: &["I can check a leaderboard snapshot if you share a date (YYYY-MM-DD)."],
    uz: &["Leaderboardni faqat sana bilan tekshira olaman (YYYY-MM-DD). Sanani yuborsangiz, tekshirib beraman."],
    ru: &["Я могу проверить лидерборд по дате (YYYY-MM-DD). Пришлите дату, и я посмотрю."],
};

const LEADERBOARD_MISSING_RANK: ReplyPool = ReplyPool {
    en: &["Which rank should I check (for example, 2nd place)?"],
    uz: &["Qaysi orin kerak (masalan, 2-orin)?"],
    ru: &["Какое место проверить (например, 2-е место)?"],
};

const LEADERBOARD_NOT_FOUND: ReplyPool = ReplyPool {
    en: &["I can't access that exact leaderboard snapshot yet. Here's how to check it in the app: open /leaderboard, open History, and pick the date and scope."],
    uz: &["Bu aniq leaderboard snapshotini hozir olib kelolmayman. Ilovada tekshirish uchun: /leaderboard sahifasini oching, History bo'limini oching va sana hamda scope-ni tanlang."],
    ru: &["Я пока не могу получить этот снимок лидерборда. Проверьте в приложении: откройте /leaderboard, откройте History и выберите дату и период."],
};

/// Fixed English reply for the top-level exception handler. Intentionally not
/// localized: if the pipeline itself failed, the detected language may not be
/// trustworthy.
pub const GENERIC_FAILURE: &str =
    "Uh oh, something glitchy happened. Ask me again in a moment and I’ll be ready!";

pub fn off_topic_reply(language: SupportedLanguage) -> String {
    OFF_TOPIC.pick(language)
}

pub fn moderation_reply(language: SupportedLanguage) -> String {
    MODERATION.pick(language)
}

pub fn error_reply(language: SupportedLanguage) -> String {
    ERROR.pick(language)
}

pub fn paused_reply(language: SupportedLanguage) -> String {
    PAUSED.pick(language)
}

pub fn refusal_personal_reply(language: SupportedLanguage) -> String {
    REFUSAL_PERSONAL.pick(language)
}

pub fn refusal_admin_reply(language: SupportedLanguage) -> String {
    REFUSAL_ADMIN.pick(language)
}

pub fn leaderboard_missing_date_reply(language: SupportedLanguage) -> String {
    LEADERBOARD_MISSING_DATE.pick(language)
}

pub fn leaderboard_missing_rank_reply(language: SupportedLanguage) -> String {
    LEADERBOARD_MISSING_RANK.pick(language)
}

pub fn leaderboard_not_found_reply(language: SupportedLanguage) -> String {
    LEADERBOARD_NOT_FOUND.pick(language)
}

pub fn leaderboard_scope_label(scope: Scope, language: SupportedLanguage) -> &'static str {
    match (language, scope) {
        (SupportedLanguage::En, Scope::Day) => "Daily",
        (SupportedLanguage::En, Scope::Week) => "Weekly",
        (SupportedLanguage::En, Scope::Month) => "Monthly",
        (SupportedLanguage::Uz, Scope::Day) => "Kunlik",
        (SupportedLanguage::Uz, Scope::Week) => "Haftalik",
        (SupportedLanguage::Uz, Scope::Month) => "Oylik",
        (SupportedLanguage::Ru, Scope::Day) => "Ежедневный",
        (SupportedLanguage::Ru, Scope::Week) => "Еженедельный",
        (SupportedLanguage::Ru, Scope::Month) => "Ежемесячный",
    }
}
