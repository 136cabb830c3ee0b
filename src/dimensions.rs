use crate::models::DimensionId;
use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy)]
pub struct Dimension {
    pub id: DimensionId,
    pub name: &'static str,
    pub color: &'static str,
    pub keywords: &'static [&'static str],
}

pub static DIMENSIONS: [Dimension; 8] = [
    Dimension {
        id: DimensionId::Career,
        name: "职业发展",
        color: "#3b82f6",
        keywords: &[
            "工作", "加班", "开会", "项目", "同事", "领导", "升职", "跳槽", "职业", "公司", "任务", "汇报", "会议",
            "业务", "客户", "方案", "报告", "需求", "产品", "设计", "代码", "测试", "上线", "复盘", "绩效", "考核",
            "面试", "简历", "应聘", "实习", "转正", "离职", "辞职", "入职", "培训", "出差", "加薪", "降薪", "调岗",
        ],
    },
    Dimension {
        id: DimensionId::Finance,
        name: "财务状况",
        color: "#10b981",
        keywords: &[
            "钱", "工资", "理财", "投资", "购物", "消费", "存款", "收入", "支出", "财务", "账单", "买", "花", "省",
            "赚", "薪", "奖金", "股票", "基金", "房贷", "车贷", "贷款", "信用卡", "债", "欠", "还款", "利息", "保险",
            "报销", "发票", "税", "红包", "转账", "支付", "余额", "预算",
        ],
    },
    Dimension {
        id: DimensionId::Health,
        name: "个人健康",
        color: "#ef4444",
        keywords: &[
            "运动", "健身", "跑步", "睡眠", "体检", "医院", "身体", "健康", "锻炼", "瑜伽", "累", "疲惫", "休息",
            "八段锦", "太极", "游泳", "篮球", "足球", "羽毛球", "散步", "爬山", "骑车", "拉伸", "冥想", "打卡", "减肥",
            "增肌", "养生", "早睡", "熬夜", "生病", "感冒", "发烧", "咳嗽", "头痛", "胃痛", "过敏", "药", "吃药",
            "打针", "输液", "挂号", "就医", "复查", "康复", "拉屎", "拉肚子", "便秘", "上厕所", "大便", "小便", "尿",
            "屎", "拉稀", "腹泻", "消化", "肠胃", "吐", "呕吐", "恶心", "晕", "眩晕", "痛", "酸痛", "肌肉", "骨头",
            "关节", "扭伤", "受伤", "流血", "伤口", "包扎",
        ],
    },
    Dimension {
        id: DimensionId::Leisure,
        name: "娱乐休闲",
        color: "#f59e0b",
        keywords: &[
            "电影", "游戏", "旅游", "音乐", "书", "阅读", "娱乐", "放松", "看剧", "综艺", "短视频", "刷手机", "追剧",
            "动漫", "音乐会", "演唱会", "展览", "博物馆", "咖啡", "奶茶", "美食", "逛街", "购物", "摄影", "画画", "唱歌",
            "KTV", "酒吧", "夜店", "喝酒", "醉", "宿醉", "派对", "party", "聚餐", "火锅", "烧烤", "串串", "麻辣烫",
            "小吃", "零食", "甜品", "蛋糕", "冰淇淋", "喝茶", "品茶", "钓鱼", "露营", "野餐", "徒步", "登山", "骑行",
            "自驾", "飞机", "高铁", "火车", "景点", "打游戏", "开黑", "上分", "掉分", "输了", "赢了", "吃鸡", "王者",
            "英雄联盟", "switch", "ps", "xbox", "主机", "手游", "端游",
        ],
    },
    Dimension {
        id: DimensionId::Family,
        name: "家庭",
        color: "#ec4899",
        keywords: &[
            "爸妈", "父母", "家人", "回家", "家庭", "妈妈", "爸爸", "母亲", "父亲", "亲人", "家里", "弟弟", "妹妹",
            "哥哥", "姐姐", "爷爷", "奶奶", "外公", "外婆", "叔叔", "阿姨", "亲戚", "团聚", "陪伴", "孩子", "儿子",
            "女儿", "宝宝", "老婆", "老公", "媳妇", "丈夫", "妻子", "婆婆", "公公", "岳父", "岳母", "姑姑", "舅舅",
            "姨妈", "堂弟", "堂妹", "表弟", "表妹", "侄子", "侄女", "外甥", "外甥女", "孙子", "孙女", "家务", "做饭",
            "洗碗", "扫地", "拖地", "洗衣服", "晾衣服", "收衣服", "整理", "打扫", "卫生", "垃圾", "倒垃圾",
        ],
    },
    Dimension {
        id: DimensionId::Social,
        name: "朋友和重要他人",
        color: "#8b5cf6",
        keywords: &[
            "朋友", "聚会", "聊天", "约饭", "社交", "见面", "伙伴", "同学", "老友", "吵架", "恋爱", "伴侣", "男朋友",
            "女朋友", "对象", "约会", "表白", "分手", "复合", "闺蜜", "兄弟", "好友", "网友", "相亲", "追", "被追",
            "暗恋", "喜欢", "爱", "想念", "思念", "牵挂", "关心", "在乎", "陪", "陪伴", "一起", "合照", "自拍",
            "发朋友圈", "点赞", "评论", "私信", "微信", "QQ", "电话", "视频", "语音", "消息", "回复", "已读", "未读",
            "拉黑", "删除", "屏蔽", "拉群", "退群", "群聊", "单聊",
        ],
    },
    Dimension {
        id: DimensionId::Growth,
        name: "个人成长",
        color: "#14b8a6",
        keywords: &[
            "学习", "课程", "读书", "技能", "知识", "成长", "进步", "思考", "笔记", "复盘", "总结", "培训", "考试",
            "证书", "英语", "编程", "设计", "写作", "演讲", "沟通", "反思", "提升", "突破", "认知", "感悟", "领悟",
            "明白", "懂了", "理解", "学会", "掌握", "精通", "练习", "背", "记忆", "记住", "忘了", "复习", "预习",
            "作业", "论文", "研究", "调研", "实验", "数据", "分析", "思维", "逻辑", "批判", "独立", "自主", "主动",
            "被动", "拖延", "效率", "专注", "分心", "走神",
        ],
    },
    Dimension {
        id: DimensionId::Fulfillment,
        name: "自我实现",
        color: "#6366f1",
        keywords: &[
            "梦想", "目标", "价值", "意义", "创作", "写作", "作品", "理想", "使命", "天赋", "热爱", "志愿", "公益",
            "帮助", "贡献", "影响力", "成就", "突破", "创新", "探索", "实践", "坚持", "放弃", "选择", "决定", "勇气",
            "害怕", "恐惧", "焦虑", "迷茫", "困惑", "挣扎", "纠结", "犹豫", "后悔", "遗憾", "满足", "幸福", "快乐",
            "开心", "高兴", "兴奋", "激动", "感动", "感激", "感恩", "自豪", "骄傲", "自卑", "沮丧", "失落", "难过",
            "伤心", "痛苦", "煎熬", "折磨", "压力", "紧张", "轻松", "释然", "平静", "安静", "孤独", "寂寞", "空虚",
            "充实", "有意义", "无意义",
        ],
    },
];

static LOWERCASE_KEYWORDS: Lazy<Vec<(DimensionId, Vec<String>)>> = Lazy::new(|| {
    DIMENSIONS
        .iter()
        .map(|dimension| {
            let keywords = dimension.keywords.iter().map(|keyword| keyword.to_lowercase()).collect();
            (dimension.id, keywords)
        })
        .collect()
});

pub fn dimension(id: DimensionId) -> &'static Dimension {
    // DIMENSIONS is declared in DimensionId variant order.
    &DIMENSIONS[id as usize]
}

pub fn classify(text: &str) -> Vec<DimensionId> {
    let lowered = text.to_lowercase();
    LOWERCASE_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|keyword| lowered.contains(keyword.as_str())))
        .map(|(id, _)| *id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{classify, dimension, DIMENSIONS};
    use crate::models::DimensionId;

    #[test]
    fn registry_follows_declaration_order() {
        let ids: Vec<DimensionId> = DIMENSIONS.iter().map(|d| d.id).collect();
        assert_eq!(ids, DimensionId::ALL.to_vec());
        assert_eq!(dimension(DimensionId::Social).name, "朋友和重要他人");
        assert_eq!(dimension(DimensionId::Fulfillment).color, "#6366f1");
    }

    #[test]
    fn overtime_and_fatigue_hit_career_and_health() {
        assert_eq!(
            classify("今天加班到很晚，好累"),
            vec![DimensionId::Career, DimensionId::Health]
        );
    }

    #[test]
    fn text_without_keywords_is_untagged() {
        assert!(classify("hello world").is_empty());
        assert!(classify("").is_empty());
    }

    #[test]
    fn matching_ignores_case_and_word_boundaries() {
        assert_eq!(classify("Sang at the ktv"), vec![DimensionId::Leisure]);
        assert_eq!(classify("Nintendo SWITCHES"), vec![DimensionId::Leisure]);
    }

    #[test]
    fn one_keyword_can_tag_several_dimensions() {
        // "设计" belongs to both career and growth.
        assert_eq!(
            classify("设计"),
            vec![DimensionId::Career, DimensionId::Growth]
        );
    }

    #[test]
    fn classification_is_stable_across_calls() {
        let text = "和朋友去吃火锅，花了不少钱";
        assert_eq!(classify(text), classify(text));
        assert_eq!(
            classify(text),
            vec![DimensionId::Finance, DimensionId::Leisure, DimensionId::Social]
        );
    }
}
