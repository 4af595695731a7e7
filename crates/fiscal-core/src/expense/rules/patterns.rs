//! Common regex patterns for Brazilian fiscal documents.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Generic heuristics
    pub static ref DATE_TOKEN: Regex = Regex::new(
        r"(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    pub static ref AMOUNT_TOKEN: Regex = Regex::new(
        r"\b([0-9]{1,3}(?:\.[0-9]{3})*,[0-9]{2})\b"
    ).unwrap();

    pub static ref CNPJ_TOKEN: Regex = Regex::new(
        r"\b(\d{2}[.\-]?\d{3}[.\-]?\d{3}[/\-]?\d{4}[\-/]?\d{2})\b"
    ).unwrap();

    // CPF/CNPJ
    pub static ref FISCAL_ID_LABELED: Regex = Regex::new(
        r"(?i)\b(?:CNPJ|CPF)(?:\s*/\s*(?:CNPJ|CPF|MF))?[\s:.nº°]*(\d[0-9./\-]{9,18}\d)"
    ).unwrap();

    pub static ref CNPJ_STANDALONE: Regex = Regex::new(
        r"\b(\d{2}\.?\d{3}\.?\d{3}/?\d{4}-?\d{2})\b"
    ).unwrap();

    pub static ref CPF_STANDALONE: Regex = Regex::new(
        r"\b(\d{3}\.?\d{3}\.?\d{3}-?\d{2})\b"
    ).unwrap();

    // Access key
    pub static ref ACCESS_KEY_LABELED: Regex = Regex::new(
        r"(?i)(?:Chave\s+de\s+Acesso|CHAVE)[:\s]*([0-9][0-9 \t]{43,59})"
    ).unwrap();

    pub static ref ACCESS_KEY_RUN: Regex = Regex::new(
        r"([0-9\s]{50,70})"
    ).unwrap();

    // Payment codes
    pub static ref DIGIT_GROUP_RUN: Regex = Regex::new(
        r"\d[\d .\-]*\d"
    ).unwrap();

    pub static ref TYPEABLE_LINE_BANK: Regex = Regex::new(
        r"\b(\d{5}\.?\d{5}[ \t]*\d{5}\.?\d{6}[ \t]*\d{5}\.?\d{6}[ \t]*\d[ \t]*\d{14})\b"
    ).unwrap();

    pub static ref TYPEABLE_LINE_COLLECTION: Regex = Regex::new(
        r"\b(\d{11}-?\d[ \t]*\d{11}-?\d[ \t]*\d{11}-?\d[ \t]*\d{11}-?\d)\b"
    ).unwrap();

    pub static ref PIX_LABELED: Regex = Regex::new(
        r"(?i)(?:PIX.*Copia.*Cola|C[oó]pia.*Cola)[:\s]*([A-Za-z0-9./\-]+)"
    ).unwrap();

    pub static ref PIX_EMV: Regex = Regex::new(
        r"\b(000201\S{20,})"
    ).unwrap();

    pub static ref BANK_CODE: Regex = Regex::new(
        r"(?i)\bBanco[^\n\d]{0,40}?(\d{3})(?:-\d)?\b"
    ).unwrap();

    // Invoice
    pub static ref FREIGHT: Regex = Regex::new(
        r"(?i)Valor\s+(?:Total\s+)?do\s+Frete[:\s]*R?\$?\s*([0-9.,]+)"
    ).unwrap();

    pub static ref INSURANCE: Regex = Regex::new(
        r"(?i)Valor\s+(?:Total\s+)?do\s+Seguro[:\s]*R?\$?\s*([0-9.,]+)"
    ).unwrap();

    pub static ref DISCOUNTS: Regex = Regex::new(
        r"(?i)Descontos?(?:\s+Incondicionados?)?[:\s]*R?\$?\s*([0-9.,]+)"
    ).unwrap();

    pub static ref ITEM_LINE: Regex = Regex::new(
        r"(?im)^[ \t]*(?:\d+[ \t]+)?(\p{L}[^\n]*?)[ \t]+(\d+(?:,\d{1,4})?)[ \t]+(?:UN|UND|PC|PCT|KG|CX|LT|M|M2|M3|KWH)[ \t]+([0-9.]+,\d{2,4})[ \t]+([0-9.]+,\d{2})[ \t]*$"
    ).unwrap();

    // Electricity invoice
    pub static ref METER_NUMBER: Regex = Regex::new(
        r"(?i)(?:N[º°o]?\.?\s*(?:do\s+)?Medidor|Medidor)[:\s]*([A-Z0-9][A-Z0-9\-]*)"
    ).unwrap();

    pub static ref PREVIOUS_READING: Regex = Regex::new(
        r"(?i)Leitura\s+Anterior[:\s]*(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    pub static ref CURRENT_READING: Regex = Regex::new(
        r"(?i)Leitura\s+Atual[:\s]*(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    pub static ref BILLING_PERIOD: Regex = Regex::new(
        r"(?i)Per[ií]odo[^\d\n]*(\d{2}/\d{2}/\d{4})\s*(?:a|at[eé]|-)\s*(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    // Service invoice
    pub static ref VERIFICATION_CODE: Regex = Regex::new(
        r"(?i)C[oó]digo\s+de\s+Verifica[cç][aã]o[:\s]*([A-Z0-9][A-Z0-9.\-]*)"
    ).unwrap();

    pub static ref SERVICE_DESCRIPTION: Regex = Regex::new(
        r"(?i)Discrimina[cç][aã]o\s+(?:dos\s+)?Servi[cç]os?[:\s]*([^\n]+)"
    ).unwrap();

    pub static ref ISS_RATE: Regex = Regex::new(
        r"(?i)Al[ií]quota(?:\s+(?:do\s+)?ISS)?(?:\s*\(%\))?[:\s]*([0-9.,]+)"
    ).unwrap();

    pub static ref ISS_VALUE: Regex = Regex::new(
        r"(?i)Valor\s+(?:do\s+)?ISS(?:QN)?[:\s]*R?\$?\s*([0-9.,]+)"
    ).unwrap();

    pub static ref NET_VALUE: Regex = Regex::new(
        r"(?i)Valor\s+L[ií]quido(?:\s+da\s+Nota)?[:\s]*R?\$?\s*([0-9.,]+)"
    ).unwrap();

    // Transport document
    pub static ref SENDER: Regex = Regex::new(
        r"(?i)Remetente[:\s]*([^\n]+)"
    ).unwrap();

    pub static ref VEHICLE_PLATE: Regex = Regex::new(
        r"(?i)Placa(?:\s+do\s+Ve[ií]culo)?[:\s]*([A-Z]{3}-?\d[A-Z0-9]\d{2})"
    ).unwrap();

    pub static ref CARGO_WEIGHT: Regex = Regex::new(
        r"(?i)Peso(?:\s+Bruto)?(?:\s*\(kg\))?[:\s]*([0-9.,]+)"
    ).unwrap();

    pub static ref CARGO_TYPE: Regex = Regex::new(
        r"(?i)(?:Produto\s+Predominante|Natureza\s+da\s+Carga)[:\s]*([^\n]+)"
    ).unwrap();

    pub static ref DRIVER: Regex = Regex::new(
        r"(?i)Motorista[:\s]*([^\n]+)"
    ).unwrap();

    // Bank slip
    pub static ref BENEFICIARY: Regex = Regex::new(
        r"(?im)(?:Benefici[aá]rio|Cedente)[:\s]*([^\n]+?)(?:[ \t]+(?:CNPJ|CPF)\b|[ \t]*$)"
    ).unwrap();

    pub static ref OUR_NUMBER: Regex = Regex::new(
        r"(?i)Nosso\s+N[uú]mero[:\s]*([0-9][0-9/.\-]*)"
    ).unwrap();

    pub static ref INTEREST: Regex = Regex::new(
        r"(?i)(?:Juros|Mora)(?:\s*/\s*Mora)?[:\s]*R?\$?\s*([0-9.,]+)"
    ).unwrap();

    pub static ref FINE: Regex = Regex::new(
        r"(?i)Multa[:\s]*R?\$?\s*([0-9.,]+)"
    ).unwrap();

    // Tax guides
    pub static ref GUIDE_DUE_DATE: Regex = Regex::new(
        r"(?i)(?:Vencimento|Data.*Vencimento)[:\s]*(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    pub static ref GUIDE_PAYER_NAME: Regex = Regex::new(
        r"(?i:Raz[aã]o\s+Social|Nome)[:\s]*([A-Z][A-Z0-9 .&\-]*(?:LTDA|S/A|ME|EPP|EIRELI)?)"
    ).unwrap();

    pub static ref DARF_TOTAL: Regex = Regex::new(
        r"(?i)(?:Valor\s+Total|Total.*Documento)[:\s]*R?\$?\s*([0-9.,]+)"
    ).unwrap();

    pub static ref DARF_ISSUER_ID: Regex = Regex::new(
        r"(?i)(?:CNPJ|CPF)[:\s]*([0-9./\-]{14,20})"
    ).unwrap();

    pub static ref DARF_PERIOD: Regex = Regex::new(
        r"(?i)(?:Per[ií]odo.*Apura[cç][aã]o|\bPA\b)[:\s]*([A-Za-z]{3}/\d{4}|\d{2}/\d{4})"
    ).unwrap();

    pub static ref DARF_DOCUMENT_NUMBER: Regex = Regex::new(
        r"(?i)(?:N[uú]mero.*Documento|Documento)[:\s]*(\d+)"
    ).unwrap();

    pub static ref DARF_RECEIPT_NUMBER: Regex = Regex::new(
        r"(?i)(?:N[uú]mero.*Recibo|Recibo)[:\s]*(\d+)"
    ).unwrap();

    pub static ref DARF_TAX_LINE: Regex = Regex::new(
        r"(?m)^[ \t]*(\d{4})[ \t]*-?[ \t]*(\p{Lu}[\p{Lu}0-9 /.]*?)[ \t]*-?[ \t]*(?i:Principal|Valor)[: \t]*([0-9.,]+)(?:.*?(?i:Multa)[: \t]*([0-9.,]+))?(?:.*?(?i:Juros)[: \t]*([0-9.,]+))?(?:.*?(?i:Total)[: \t]*([0-9.,]+))?"
    ).unwrap();

    pub static ref FGTS_TOTAL: Regex = Regex::new(
        r"(?i)(?:Valor\s+(?:a\s+)?Recolher|Total\s+a\s+Recolher)[:\s]*R?\$?\s*([0-9.,]+)"
    ).unwrap();

    pub static ref FGTS_ISSUER_ID: Regex = Regex::new(
        r"(?i)(?:CPF/CNPJ\s+(?:do\s+)?Empregador|CNPJ|Empregador)[:\s]*([0-9./\-]{14,20})"
    ).unwrap();

    pub static ref FGTS_IDENTIFIER: Regex = Regex::new(
        r"\b(\d{16}-\d)\b"
    ).unwrap();

    pub static ref FGTS_COMPETENCE_LINE: Regex = Regex::new(
        r"(?im)(?:^|[^/\d])(\d{2}/\d{4})[ \t]*-?[ \t]*(\d+)[ \t]*(?:trabalhador(?:es)?)?.*?(?:Remunera[cç][aã]o|Sal[aá]rios?)[: \t]*([0-9.,]+).*?FGTS[: \t]*([0-9.,]+)"
    ).unwrap();

    pub static ref GPS_TOTAL: Regex = Regex::new(
        r"(?i)(?:Total\s+a\s+Pagar|Valor\s+Total)[:\s]*R?\$?\s*([0-9.,]+)"
    ).unwrap();

    pub static ref GPS_ISSUER_ID: Regex = Regex::new(
        r"(?i)(?:CNPJ/CEI/NIT|CNPJ)[:\s]*([0-9./\-]{11,20})"
    ).unwrap();

    pub static ref GPS_PAYMENT_CODE: Regex = Regex::new(
        r"(?i)C[oó]digo.*Pagamento[:\s]*(\d{4})"
    ).unwrap();

    pub static ref GPS_COMPETENCE: Regex = Regex::new(
        r"(?i)Compet[eê]ncia[:\s]*(\d{2}/\d{4})"
    ).unwrap();

    pub static ref GPS_IDENTIFIER: Regex = Regex::new(
        r"(?i)(?:CEI|NIT)[:\s]*(\d{11,14})"
    ).unwrap();

    pub static ref GPS_INSS: Regex = Regex::new(
        r"(?i)Valor\s+(?:do\s+)?INSS[:\s]*R?\$?\s*([0-9.,]+)"
    ).unwrap();

    pub static ref GPS_OTHER_ENTITIES: Regex = Regex::new(
        r"(?i)Valor\s+(?:de\s+)?Outras\s+Entidades[:\s]*R?\$?\s*([0-9.,]+)"
    ).unwrap();

    pub static ref GPS_MONETARY_UPDATE: Regex = Regex::new(
        r"(?i)Atualiza[cç][aã]o\s+Monet[aá]ria[:\s]*R?\$?\s*([0-9.,]+)"
    ).unwrap();
}
