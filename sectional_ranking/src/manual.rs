/*!

This is the long-form manual for `sectional_ranking` and `provrank`.

## How the ranking is computed

Every provider is a row of indicator values. Each indicator has an integer
weight, by default between 1 and 10. The overall score (the `Ranking` column)
is the weighted mean of all the indicators:

```text
Ranking = (w1 * x1 + w2 * x2 + ... + wn * xn) / (w1 + w2 + ... + wn)
```

Indicators are also grouped in sections (size, formality, quality, ...). The
score of a section is the weighted mean of its own indicators, using their
weights only. Section scores are reported next to the overall score; they do
not change the order of the providers.

Providers are sorted by decreasing overall score. Providers with the same score
keep the order of the input file.

## Input formats

The following formats are supported:
* `xlsx` Excel spreadsheet (the default)
* `csv` Comma Separated Values, UTF-8, first line is the header

In both cases the first row holds the column names. The following columns are
read:

| column              | default                         | notes                                      |
|---------------------|---------------------------------|--------------------------------------------|
| identifier          | `Prestador`                     | accents are transliterated (`Ñaupe` becomes `Naupe`) |
| longitude           | `LONGITUD`                      | decimal degrees                            |
| latitude            | `LATITUD`                       | decimal degrees                            |
| group               | `EPS`                           | optional, used for filtering               |
| indicators          | `Índice de servicios brindados` to `Distancia a la EP` | every column of the block, both ends included |

Indicator cells must be numbers. Excel booleans count as 1 and 0. Blank
indicator cells are an error unless `treatBlankAsZero` is set. Rows where every
cell is blank are skipped.

## Configuration

`provrank` works without a configuration file when the input uses the built-in
dashboard layout:

```text
provrank --input base_prestadores.xlsx --top-n 5 --group EPSEL
```

Other layouts are described with a JSON file:

```json
{
  "outputSettings": {"title": "Lambayeque", "topN": 5, "outputPath": "summary.json"},
  "dataSource": {
    "provider": "csv",
    "filePath": "prestadores.csv",
    "firstIndicator": "Cobertura",
    "lastIndicator": "Continuidad",
    "groupColumn": "EPS"
  },
  "weights": {"min": 1, "max": 10, "defaults": {"Cobertura": 2}},
  "sections": [
    {"name": "Acceso", "indicators": ["Cobertura"]},
    {"name": "Calidad", "indicators": ["Continuidad"]}
  ],
  "sharedIndicators": "reject",
  "formula": {"termsPerLine": 3}
}
```

OutputSettings:
 - `title` (string, optional): copied to the summary.
 - `outputPath` (string, optional): where to write the summary. Standard output if missing.
 - `groupFilter` (string, optional): only report the providers of this group.
 - `topN` (number, default 10): the providers compared in the radar data, and
   the highlighted markers.
 - `highlightThreshold` (number, optional): highlight the markers whose overall
   score is at least this value, instead of the first `topN`.

DataSource:
 - `provider` (`xlsx` or `csv`, default `xlsx`)
 - `filePath` (string): relative to the directory of the configuration file.
 - `excelWorksheetName` (string, optional): the first worksheet if missing.
 - `identifierColumn`, `longitudeColumn`, `latitudeColumn`, `groupColumn`
   (strings, optional): see the table above. An empty `groupColumn` (`""`) means
   that the file has no group. `null` keeps the default `EPS`.
 - `firstIndicator`, `lastIndicator` (strings, optional)
 - `treatBlankAsZero` (boolean, default false)

Weights:
 - `min`, `max` (numbers, default 1 and 10). The reduced dashboard uses 1 to 5.
 - `defaults` (object, optional): initial weight per indicator. Indicators
   without an entry start at 1. If the whole object is missing, the weights of
   the built-in dashboard are used.

Sections: a list of `{name, indicators}`. The built-in sections are used if
missing. Names must be unique and every section needs at least one indicator.
`sharedIndicators` (`allow` or `reject`, default `allow`) decides whether an
indicator may appear in more than one section. The built-in schema lists the
municipal recognition indicator in two sections and needs `allow`.

Indicators of a section that are not columns of the input are skipped with a
warning. A section left without any indicator is an error.

## Adjusting the weights

`--weight NAME=VALUE` changes one weight before ranking, and may be repeated.
A value outside of the range, or a name that is not an indicator, is reported
and the previous weight is kept.

## Output

The summary is a JSON object with:
 - `formula`: the LaTeX rendering of the current weighted mean,
 - `weights`, `sections`, `groups`,
 - `results`: one entry per provider with its indicators, `Ranking` and section scores,
 - `markers` and `center`: the map data,
 - `radar`: the section scores of the first `topN` providers.

The program exits with code 2 when the input cannot be loaded, and 1 for
other errors.

 */
