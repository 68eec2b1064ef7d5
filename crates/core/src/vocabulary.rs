//! Built-in substance vocabulary.
//!
//! Seed names that stay known when every remote source is down or disabled.

use std::collections::BTreeSet;

/// Common substances known without asking any source.
pub const BUILTIN_SUBSTANCES: &[&str] = &[
    "Cocaine", "Heroin", "Methamphetamine", "MDMA", "LSD", "Cannabis", "Marijuana", "Ketamine", "Alcohol",
    "Nicotine", "Caffeine", "Psilocybin", "DMT", "Amphetamine", "Morphine", "Codeine", "Oxycodone", "Xanax",
    "Valium", "Adderall", "Alprazolam", "Diazepam", "Clonazepam", "Lorazepam", "Fentanyl", "Hydrocodone",
    "Tramadol", "Methadone", "PCP", "GHB", "Mescaline", "2C-B", "NBOMe", "Salvia", "Kratom", "DXM", "Nitrous",
    "Khat", "Modafinil",
];

/// Street and brand names keyed by the substance they refer to.
pub const ALTERNATE_NAMES: &[(&str, &[&str])] = &[
    ("Cannabis", &["Weed", "Pot", "Marijuana", "THC", "Grass", "Hash", "Hemp"]),
    ("MDMA", &["Ecstasy", "Molly", "XTC", "E", "Roll", "Bean", "Adam"]),
    ("Cocaine", &["Coke", "Crack", "Snow", "Blow", "White", "Nose Candy"]),
    ("Methamphetamine", &["Meth", "Crystal", "Ice", "Glass", "Tina", "Crank", "Speed"]),
    ("Heroin", &["Dope", "Smack", "H", "Horse", "Tar", "Brown"]),
    ("LSD", &["Acid", "Lucy", "Tabs", "Paper", "Blotter", "Dots"]),
    ("Psilocybin", &["Mushrooms", "Shrooms", "Magic Mushrooms", "Caps", "Boomers"]),
    ("Ketamine", &["K", "Special K", "Kit Kat", "Cat Valium"]),
    ("Alprazolam", &["Xanax", "Bars", "Planks", "Sticks"]),
    ("Diazepam", &["Valium", "Blues", "Benzos"]),
    ("GHB", &["G", "Liquid X", "Georgia Home Boy"]),
    ("PCP", &["Angel Dust", "Dust", "Wet"]),
    ("DMT", &["Dimitri", "Spirit Molecule", "Businessman's Trip"]),
    ("Nitrous", &["Laughing Gas", "Whippits", "Nos"]),
    ("Amphetamine", &["Speed", "Pep", "Uppers"]),
    ("DXM", &["Robotussin", "Robo", "Triple C"]),
    ("2C-B", &["Nexus", "Venus", "Bees"]),
    ("Modafinil", &["Provigil", "Moda"]),
    ("Fentanyl", &["China White", "Apache", "China Girl"]),
    ("Oxycodone", &["Oxy", "OC", "Kicker"]),
];

/// Every built-in name and alternate name, lowercased.
pub fn builtin_names() -> BTreeSet<String> {
    BUILTIN_SUBSTANCES
        .iter()
        .copied()
        .chain(ALTERNATE_NAMES.iter().flat_map(|(name, alternates)| std::iter::once(*name).chain(alternates.iter().copied())))
        .map(str::to_lowercase)
        .collect()
}
