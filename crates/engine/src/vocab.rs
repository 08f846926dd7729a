//! Built-in keyword tables. `EngineConfig::default()` copies these; a TOML config can
//! replace any of them.

pub(crate) const DOMAIN_KEYWORDS_LATIN: &[&str] = &[
    "ai",
    "model",
    "models",
    "llm",
    "agent",
    "agents",
    "inference",
    "training",
    "benchmark",
    "parameters",
    "tokens",
    "api",
    "open source",
    "open-source",
    "launch",
    "launched",
    "release",
    "released",
    "funding",
    "acquisition",
    "gpu",
    "chip",
    "dataset",
    "fine-tuning",
    "multimodal",
    "reasoning",
    "developer",
    "sdk",
    "pricing",
    "generally available",
    "preview",
    "startup",
    "valuation",
    "revenue",
];

pub(crate) const DOMAIN_KEYWORDS_CJK: &[&str] = &[
    "模型",
    "大模型",
    "人工智能",
    "智能体",
    "推理",
    "训练",
    "开源",
    "发布",
    "融资",
    "芯片",
    "算力",
    "参数",
    "基准",
    "数据集",
    "多模态",
    "开发者",
    "估值",
    "营收",
];

pub(crate) const BOILERPLATE_LATIN: &[&str] = &[
    "stay tuned",
    "subscribe",
    "sign in",
    "sign up",
    "log in",
    "weekly roundup",
    "top links",
    "newsletter",
    "click here",
    "read more",
    "monitoring continues",
    "all rights reserved",
    "cookie policy",
    "follow us",
    "share this",
    "advertisement",
    "sponsored",
];

pub(crate) const BOILERPLATE_CJK: &[&str] = &[
    "敬请期待",
    "点击阅读",
    "阅读原文",
    "关注我们",
    "订阅",
    "登录",
    "扫码",
    "免责声明",
    "版权所有",
    "持续关注中",
    "广告",
];

/// Capitalised words that never count as entity tokens.
pub(crate) const ENTITY_STOPWORDS: &[&str] = &[
    "the", "this", "that", "these", "those", "there", "here", "and", "but", "for", "with",
    "from", "into", "our", "their", "its", "his", "her", "they", "we", "you", "it", "today",
    "yesterday", "tomorrow", "now", "new", "also", "however", "meanwhile", "according",
    "after", "before", "when", "while", "what", "why", "how", "who", "which", "all", "some",
    "more", "most", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday",
    "sunday",
];

pub(crate) const DANGLING_LATIN: &[&str] = &[
    "and", "or", "but", "with", "to", "of", "for", "the", "a", "an", "in", "on", "at", "by",
    "from", "as", "that", "which", "while", "including", "via", "than", "because", "into",
    "about", "such as", "whether", "if", "its", "their",
];

/// Sentence-final particles (`了`, `等`, `吗`) close a clause and stay out of this list.
pub(crate) const DANGLING_CJK: &[&str] = &[
    "的", "和", "与", "及", "并", "但", "而", "或", "在", "对", "将", "以", "为", "是",
    "把", "被", "从", "向", "以及", "包括", "通过", "由于", "因为", "并且", "但是",
    "其中", "比如", "例如",
];

/// Verbatim substrings known to be hollow filler. Any match forces a fallback.
pub(crate) const BANNED_TEMPLATES: &[&str] = &[
    "该事件值得持续关注",
    "具体影响有待进一步观察",
    "更多细节尚未披露",
    "详情请关注后续报道",
    "这一动态反映了行业的快速发展",
    "stay tuned for more",
    "details to follow",
    "more details to come",
    "monitoring continues",
    "lorem ipsum",
    "insert summary here",
    "[placeholder]",
];

pub(crate) const PRODUCT_LATIN: &[&str] = &[
    "launch",
    "launched",
    "launches",
    "release",
    "released",
    "releases",
    "generally available",
    "available",
    "pricing",
    "price",
    "subscription",
    "app",
    "feature",
    "features",
    "rollout",
    "rolls out",
    "preview",
    "beta",
    "users",
    "update",
    "plugin",
    "product",
];

pub(crate) const PRODUCT_CJK: &[&str] = &[
    "发布", "上线", "推出", "定价", "订阅", "功能", "应用", "产品", "公测", "内测", "更新",
    "用户",
];

pub(crate) const TECH_LATIN: &[&str] = &[
    "model",
    "parameters",
    "benchmark",
    "training",
    "inference",
    "architecture",
    "paper",
    "research",
    "dataset",
    "reasoning",
    "multimodal",
    "fine-tuning",
    "transformer",
    "context window",
    "tokens",
    "accuracy",
    "state-of-the-art",
    "sota",
    "mmlu",
    "algorithm",
];

pub(crate) const TECH_CJK: &[&str] = &[
    "模型", "参数", "基准", "训练", "推理", "架构", "论文", "研究", "数据集", "多模态", "微调",
    "上下文", "准确率", "算法",
];

pub(crate) const BUSINESS_LATIN: &[&str] = &[
    "funding",
    "raised",
    "raises",
    "valuation",
    "acquisition",
    "acquires",
    "acquired",
    "revenue",
    "investment",
    "investors",
    "ipo",
    "partnership",
    "deal",
    "market",
    "earnings",
    "billion",
    "million",
    "customers",
    "enterprise",
    "layoffs",
];

pub(crate) const BUSINESS_CJK: &[&str] = &[
    "融资", "估值", "收购", "营收", "投资", "上市", "合作", "市场", "财报", "企业", "客户",
    "裁员",
];

pub(crate) const DEV_LATIN: &[&str] = &[
    "api",
    "sdk",
    "open source",
    "open-source",
    "github",
    "repository",
    "library",
    "framework",
    "developers",
    "developer",
    "cli",
    "code",
    "release notes",
    "pull request",
    "documentation",
    "rust",
    "python",
    "npm",
    "pip",
];

pub(crate) const DEV_CJK: &[&str] = &[
    "开源", "开发者", "代码", "仓库", "框架", "接口", "文档", "工具链",
];

pub(crate) const HARD_NEGATIVE_LATIN: &[&str] = &[
    "real estate",
    "construction",
    "mortgage",
    "apartment",
    "housing market",
    "property developer",
    "renovation",
    "interior design",
    "horoscope",
    "celebrity",
    "recipe",
    "football",
    "lottery",
];

pub(crate) const HARD_NEGATIVE_CJK: &[&str] = &[
    "房地产", "楼盘", "房价", "装修", "施工", "地产", "物业", "彩票", "星座", "明星", "菜谱",
];

pub(crate) const CORE_DOMAIN_LATIN: &[&str] = &[
    "ai",
    "artificial intelligence",
    "machine learning",
    "deep learning",
    "llm",
    "llms",
    "large language model",
    "large language models",
    "generative ai",
    "genai",
    "neural network",
    "gpt",
    "chatbot",
    "foundation model",
    "transformer",
    "diffusion model",
    "ai agent",
];

pub(crate) const CORE_DOMAIN_CJK: &[&str] = &[
    "人工智能",
    "大模型",
    "机器学习",
    "深度学习",
    "神经网络",
    "生成式",
    "智能体",
    "语言模型",
    "算力",
];

pub(crate) const ENTITY_WHITELIST_LATIN: &[&str] = &[
    "OpenAI",
    "Anthropic",
    "DeepMind",
    "Google DeepMind",
    "Hugging Face",
    "NVIDIA",
    "Mistral AI",
    "Meta AI",
    "Microsoft",
    "xAI",
    "Perplexity",
    "Stability AI",
    "Cohere",
    "ChatGPT",
    "Claude",
    "Gemini",
    "Llama",
    "DeepSeek",
    "Qwen",
];

pub(crate) const ENTITY_WHITELIST_CJK: &[&str] = &[
    "百度",
    "阿里云",
    "腾讯混元",
    "字节跳动",
    "智谱",
    "月之暗面",
    "通义千问",
    "文心一言",
    "讯飞星火",
];

/// Model families that qualify as product anchors when followed by a version.
pub(crate) const MODEL_ROSTER: &[&str] = &[
    "GPT",
    "Claude",
    "Gemini",
    "Gemma",
    "Llama",
    "Qwen",
    "DeepSeek",
    "Mistral",
    "Mixtral",
    "Grok",
    "Phi",
    "Sora",
    "Veo",
    "Imagen",
    "DALL-E",
    "Stable Diffusion",
    "ERNIE",
    "GLM",
    "ChatGLM",
    "Kimi",
    "Baichuan",
    "InternLM",
    "Hunyuan",
    "Doubao",
];

pub(crate) const MODEL_ROSTER_CJK: &[&str] = &["文心", "通义千问", "混元", "豆包", "星火"];

/// Suffixes that may trail a model version (`Claude 3.5 Sonnet`, `GPT-4o mini`).
pub(crate) const MODEL_VARIANTS: &[&str] = &[
    "Turbo", "Pro", "Ultra", "Mini", "mini", "Flash", "Nano", "Sonnet", "Opus", "Haiku",
    "Instruct", "Chat", "Coder", "Max", "Plus", "Lite",
];

/// Matched case-sensitively so `MATH` never fires on prose.
pub(crate) const BENCHMARKS: &[&str] = &[
    "MMLU",
    "MMLU-Pro",
    "GSM8K",
    "HumanEval",
    "MATH",
    "SWE-bench",
    "SWE-bench Verified",
    "GPQA",
    "GPQA Diamond",
    "ARC-AGI",
    "HellaSwag",
    "MT-Bench",
    "Chatbot Arena",
    "LMArena",
    "C-Eval",
    "CMMLU",
    "BIG-Bench",
    "AIME",
    "LiveCodeBench",
    "MMMU",
    "TruthfulQA",
    "Humanity's Last Exam",
];

/// Capitalised words that must never become a product name.
pub(crate) const NAME_STOPWORDS: &[&str] = &[
    "The", "This", "That", "Version", "Chapter", "Page", "Step", "Phase", "Section", "Part",
    "Figure", "Table", "Level", "Round", "Day", "Days", "Week", "Weeks", "Year", "Years",
    "Top", "Series", "Model", "Models", "Update", "Release", "Since", "From", "Until",
    "Before", "After", "About", "Over", "Under", "With", "Than", "Only", "Around", "Nearly",
    "Almost", "Just", "Number", "Item", "Issue", "Season", "Episode", "Volume", "Grade",
    "Class", "Room", "Floor", "Gate", "Route", "Highway",
];

/// Nouns that turn `1B` into a headcount rather than a parameter count.
pub(crate) const COUNTED_NOUNS: &[&str] = &[
    "users",
    "user",
    "people",
    "downloads",
    "views",
    "visits",
    "customers",
    "devices",
    "subscribers",
    "requests",
    "queries",
    "messages",
    "images",
    "videos",
    "tokens",
    "dollars",
    "usd",
    "用户",
    "次",
    "人",
];

pub(crate) const ROLE_EVENT_LATIN: &[&str] = &[
    "launched",
    "launches",
    "launch",
    "released",
    "releases",
    "announced",
    "announces",
    "unveiled",
    "unveils",
    "introduced",
    "introduces",
    "acquired",
    "acquires",
    "raised",
    "raises",
    "open-sourced",
    "open sources",
    "rolled out",
    "rolls out",
    "debuted",
    "shipped",
    "published",
];

pub(crate) const ROLE_EVENT_CJK: &[&str] = &[
    "发布", "推出", "宣布", "上线", "开源", "收购", "融资", "亮相", "公布", "正式",
];

pub(crate) const ROLE_IMPACT_LATIN: &[&str] = &[
    "enables",
    "enabling",
    "allows",
    "allowing",
    "impact",
    "improves",
    "improving",
    "reduces",
    "reducing",
    "lowers",
    "cuts",
    "boosts",
    "helps",
    "means",
    "making it",
    "outperforms",
    "cheaper",
    "faster",
    "cost",
    "costs",
    "market share",
    "competition",
    "pressure",
];

pub(crate) const ROLE_IMPACT_CJK: &[&str] = &[
    "意味着", "影响", "提升", "降低", "帮助", "使得", "推动", "加速", "冲击", "优于", "超越",
    "成本",
];

pub(crate) const ROLE_NEXT_LATIN: &[&str] = &[
    "plans to",
    "will",
    "expects",
    "expected",
    "next",
    "roadmap",
    "later this year",
    "coming weeks",
    "upcoming",
    "soon",
    "waitlist",
    "rolling out to",
    "scheduled",
];

pub(crate) const ROLE_NEXT_CJK: &[&str] = &[
    "计划", "将于", "预计", "下一步", "后续", "即将", "未来", "陆续",
];

pub(crate) const ROLE_RISK_LATIN: &[&str] = &[
    "risk",
    "risks",
    "concern",
    "concerns",
    "lawsuit",
    "regulation",
    "regulatory",
    "antitrust",
    "privacy",
    "security",
    "vulnerability",
    "outage",
    "controversy",
    "criticism",
    "delay",
    "uncertain",
    "limitations",
    "hallucination",
];

pub(crate) const ROLE_RISK_CJK: &[&str] = &[
    "风险", "监管", "争议", "诉讼", "隐私", "安全", "漏洞", "宕机", "延迟", "不确定", "限制",
    "幻觉", "质疑",
];
